use clap::Parser;
use cohort_extract::{run, Cli};
use cohort_types::{ConfigError, SchemaError};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        let exit_code = if e.downcast_ref::<ConfigError>().is_some() {
            2
        } else if e.downcast_ref::<SchemaError>().is_some() {
            3
        } else {
            1
        };
        std::process::exit(exit_code);
    }
}
