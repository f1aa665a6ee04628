//! Quoting, escaping and validation primitives
//!
//! Every user supplied string ends up in one of three kinds of position:
//!
//! - **identifier** positions are wrapped with [`quote_identifier`]
//! - **literal** positions go through [`escape_literal`]
//! - **bare** positions (aggregation function, interval) cannot be quoted at
//!   all, so they must pass [`validate_identifier`] / [`validate_interval`]

use once_cell::sync::Lazy;
use regex::Regex;

use crate::query::error::{QueryError, QueryResult};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static INTERVAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+[A-Za-z]+$").expect("interval pattern is valid"));

/// Quote an identifier (measurement, field or tag key) with double quotes.
///
/// Only the double quote itself is escaped, as `\"`. Backslashes pass through
/// untouched, so a name ending in `\` escapes the closing delimiter.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\\\""))
}

/// Escape a value for use inside a literal delimited by `quote`.
///
/// Backslashes are doubled and `quote` becomes `\quote`. The backslash added
/// in front of a quote is never itself doubled.
pub fn escape_literal(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if ch == '\\' || ch == quote {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape a value for an InfluxQL single-quoted string literal
pub fn escape_influxql_literal(value: &str) -> String {
    escape_literal(value, '\'')
}

/// Escape a value for a Flux double-quoted string literal
pub fn escape_flux_string(value: &str) -> String {
    escape_literal(value, '"')
}

/// Reverse [`escape_literal`].
///
/// A backslash takes the following character verbatim; a trailing lone
/// backslash is kept as is.
pub fn unescape_literal(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`, e.g. an aggregation function name
pub fn validate_identifier(value: &str) -> QueryResult<&str> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(value)
    } else {
        Err(QueryError::InvalidIdentifier(value.to_string()))
    }
}

/// Accept only `[0-9]+[A-Za-z]+`, e.g. `5m` or `1h`
pub fn validate_interval(value: &str) -> QueryResult<&str> {
    if INTERVAL_RE.is_match(value) {
        Ok(value)
    } else {
        Err(QueryError::InvalidInterval(value.to_string()))
    }
}
