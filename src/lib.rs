//! # influx-query
//!
//! Injection-safe query string builders for InfluxDB: InfluxQL (SQL-like)
//! and Flux (pipeline) queries from one structured description.
//!
//! ## Features
//!
//! - **One input, two grammars**: a [`QuerySpec`] renders to either language
//! - **Escaping**: identifiers are quoted, literals escaped, bare tokens validated
//! - **Time handling**: naive timestamps are rendered as UTC (`...Z`)
//! - **No I/O**: the output is a plain string for whatever client you use
//!
//! ## Modules
//!
//! - [`query`]: spec, escaping primitives and the two assemblers
//! - [`config`]: TOML/env configuration for the command line tool
//! - [`logging`]: subscriber setup for the command line tool
//!
//! ## Quick Start
//!
//! ```rust
//! use influx_query::{build_influxql_query, QuerySpec, TimeRange};
//!
//! let spec = QuerySpec::select("m", ["f1", "f2"])
//!     .time_range(TimeRange::day(2026, 2, 1).unwrap())
//!     .tag("k", "v")
//!     .window("5m", "mean")
//!     .build();
//!
//! let query = build_influxql_query(&spec, "UTC")?;
//! assert!(query.starts_with("SELECT mean(\"f1\"), mean(\"f2\") FROM \"m\""));
//! # Ok::<(), influx_query::QueryError>(())
//! ```

pub mod config;
pub mod logging;
pub mod query;

// Re-export top-level types for convenience
pub use query::{
    build_flux_query, build_influxql_query, FluxQuery, InfluxQlQuery, QueryError, QueryResult,
    QuerySpec, QuerySpecBuilder, TimeRange, Timestamp,
};

pub use config::{Config, ConfigError, FluxConfig, InfluxQlConfig, LoggingConfig};
