//! Core domain types shared by the configuration compiler, the aggregation
//! kernel and the recursive extractor.
//!
//! Nothing in this crate touches I/O or SQL; it only defines the immutable
//! value types that flow between the other crates.

pub mod duration;
pub mod error;
pub mod predicate;
pub mod reference;
pub mod trigger;
pub mod window;

pub use duration::Duration;
pub use error::{ConfigError, RuntimeError, SchemaError};
pub use predicate::{DerivedExpr, PlainPredicate, PredicateCode, PredicateDef};
pub use reference::{EndpointExpr, Reference, Side};
pub use trigger::Trigger;
pub use window::{CountRange, WindowSpec};
