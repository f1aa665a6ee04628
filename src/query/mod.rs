//! Query string builders
//!
//! Builds InfluxQL and Flux query strings from a single [`QuerySpec`]:
//!
//! - **Spec**: measurement, fields, time range, tags, aggregation window
//! - **Escape**: identifier quoting, literal escaping, token validation
//! - **Time**: ISO-8601 rendering of naive and offset-aware timestamps
//! - **InfluxQL / Flux**: the two assemblers
//!
//! # Examples
//!
//! ```rust
//! use influx_query::query::{build_flux_query, build_influxql_query, QuerySpec, TimeRange};
//!
//! let spec = QuerySpec::select("cpu", ["usage_user"])
//!     .time_range(TimeRange::day(2026, 2, 1).unwrap())
//!     .tag("host", "web-1")
//!     .window("5m", "mean")
//!     .build();
//!
//! let influxql = build_influxql_query(&spec, "UTC")?;
//! assert!(influxql.contains("GROUP BY time(5m)"));
//!
//! let flux = build_flux_query("telegraf", &spec)?;
//! assert!(flux.starts_with("from(bucket: \"telegraf\")"));
//! # Ok::<(), influx_query::query::QueryError>(())
//! ```

mod error;
mod escape;
mod flux;
mod influxql;
mod spec;
mod time;

pub use error::{QueryError, QueryResult};
pub use escape::{
    escape_flux_string, escape_influxql_literal, escape_literal, quote_identifier,
    unescape_literal, validate_identifier, validate_interval,
};
pub use flux::{build_flux_query, FluxQuery, RESULT_NAME};
pub use influxql::{build_influxql_query, InfluxQlQuery, DEFAULT_TIMEZONE};
pub use spec::{QuerySpec, QuerySpecBuilder, Window};
pub use time::{format_timestamp, TimeRange, Timestamp};
