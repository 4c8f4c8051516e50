//! Parses the boundary-expr grammar into an [`EndpointExpr`].

use cohort_types::{Duration, EndpointExpr, Reference, Side};

const OPS: &[&str] = &[" + ", " - ", " -> ", " <- "];

pub fn parse_endpoint(raw: &str, side: Side) -> Result<EndpointExpr, String> {
    let raw = raw.trim();
    if raw == "NULL" {
        return Ok(EndpointExpr::Null(side));
    }

    for op in OPS {
        if let Some(idx) = raw.find(op) {
            let reference = parse_reference(raw[..idx].trim())?;
            let operand = raw[idx + op.len()..].trim();
            return match *op {
                " + " => Ok(EndpointExpr::Offset(
                    reference,
                    Duration::parse(operand).map_err(|e| e.to_string())?,
                )),
                " - " => Ok(EndpointExpr::Offset(
                    reference,
                    Duration::parse(operand).map_err(|e| e.to_string())?.negate(),
                )),
                " -> " => Ok(EndpointExpr::Next(reference, operand.to_string())),
                " <- " => Ok(EndpointExpr::Prev(reference, operand.to_string())),
                _ => unreachable!(),
            };
        }
    }

    Ok(EndpointExpr::Identity(parse_reference(raw)?))
}

fn parse_reference(raw: &str) -> Result<Reference, String> {
    if raw == "trigger" {
        return Ok(Reference::Trigger);
    }
    if let Some(name) = raw.strip_suffix(".start") {
        if name.is_empty() {
            return Err(format!("malformed reference {raw:?}"));
        }
        return Ok(Reference::WindowStart(name.to_string()));
    }
    if let Some(name) = raw.strip_suffix(".end") {
        if name.is_empty() {
            return Err(format!("malformed reference {raw:?}"));
        }
        return Ok(Reference::WindowEnd(name.to_string()));
    }
    Err(format!("malformed reference {raw:?}"))
}

/// Parses a `has` constraint value: `(min, max)` where either component may
/// be blank/`None`, meaning unbounded on that side.
pub fn parse_count_range(raw: &str) -> Result<cohort_types::CountRange, String> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| format!("malformed range {raw:?}: expected (min, max)"))?;

    let mut parts = inner.splitn(2, ',');
    let min_str = parts
        .next()
        .ok_or_else(|| format!("malformed range {raw:?}"))?
        .trim();
    let max_str = parts.next().unwrap_or("").trim();

    let parse_bound = |s: &str| -> Result<Option<i64>, String> {
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            Ok(None)
        } else {
            s.parse::<i64>()
                .map(Some)
                .map_err(|_| format!("malformed range bound {s:?}"))
        }
    };

    Ok(cohort_types::CountRange::new(
        parse_bound(min_str)?,
        parse_bound(max_str)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_null() {
        assert_eq!(
            parse_endpoint("NULL", Side::Start).unwrap(),
            EndpointExpr::Null(Side::Start)
        );
    }

    #[test]
    fn parses_identity_and_offset() {
        assert_eq!(
            parse_endpoint("trigger", Side::Start).unwrap(),
            EndpointExpr::Identity(Reference::Trigger)
        );
        assert_eq!(
            parse_endpoint("gap.end", Side::Start).unwrap(),
            EndpointExpr::Identity(Reference::WindowEnd("gap".into()))
        );
        assert_eq!(
            parse_endpoint("trigger + 24h", Side::End).unwrap(),
            EndpointExpr::Offset(Reference::Trigger, Duration::parse("24h").unwrap())
        );
        assert_eq!(
            parse_endpoint("gap.end - 12h", Side::End).unwrap(),
            EndpointExpr::Offset(
                Reference::WindowEnd("gap".into()),
                Duration::parse("-12h").unwrap()
            )
        );
    }

    #[test]
    fn parses_next_and_prev() {
        assert_eq!(
            parse_endpoint("trigger -> death", Side::End).unwrap(),
            EndpointExpr::Next(Reference::Trigger, "death".into())
        );
        assert_eq!(
            parse_endpoint("target.end <- discharge", Side::Start).unwrap(),
            EndpointExpr::Prev(Reference::WindowEnd("target".into()), "discharge".into())
        );
    }

    #[test]
    fn parses_count_ranges() {
        assert_eq!(
            parse_count_range("(5, None)").unwrap(),
            cohort_types::CountRange::new(Some(5), None)
        );
        assert_eq!(
            parse_count_range("(, 10)").unwrap(),
            cohort_types::CountRange::new(None, Some(10))
        );
        assert_eq!(
            parse_count_range("(1, 1)").unwrap(),
            cohort_types::CountRange::new(Some(1), Some(1))
        );
        assert!(parse_count_range("5, 10").is_err());
    }
}
