//! InfluxQL assembler
//!
//! Produces a single line of the form
//!
//! ```text
//! SELECT <fields> FROM "<measurement>" WHERE time >= '<start>' AND time < '<end>'
//!     [AND "<tag>" = '<value>' ...] [GROUP BY time(<interval>)] [TZ('<timezone>')]
//! ```

use crate::query::error::QueryResult;
use crate::query::escape::{escape_influxql_literal, quote_identifier};
use crate::query::spec::QuerySpec;
use crate::query::time::TimeRange;

/// Timezone used when the caller does not pick one
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Build an InfluxQL query for `spec`.
///
/// An empty `timezone` omits the `TZ(...)` clause.
pub fn build_influxql_query(spec: &QuerySpec, timezone: &str) -> QueryResult<String> {
    InfluxQlQuery::new(spec).with_timezone(timezone).render()
}

/// InfluxQL renderer over a borrowed [`QuerySpec`]
#[derive(Debug, Clone, Copy)]
pub struct InfluxQlQuery<'a> {
    spec: &'a QuerySpec,
    timezone: &'a str,
}

impl<'a> InfluxQlQuery<'a> {
    /// Render `spec` with the default `UTC` timezone
    pub fn new(spec: &'a QuerySpec) -> Self {
        Self {
            spec,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    /// Override the `TZ(...)` clause; empty disables it
    pub fn with_timezone(mut self, timezone: &'a str) -> Self {
        self.timezone = timezone;
        self
    }

    /// Validate and assemble the query string
    pub fn render(&self) -> QueryResult<String> {
        let spec = self.spec;
        let window = spec.window()?;

        let fields = spec
            .fields
            .iter()
            .map(|field| match window.aggregation {
                Some(agg) => format!("{}({})", agg, quote_identifier(field)),
                None => quote_identifier(field),
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut condition = time_condition(&spec.time_range);
        if spec.has_tags() {
            condition.push_str(" AND ");
            condition.push_str(&tags_condition(spec));
        }

        let mut query = format!(
            "SELECT {} FROM {} WHERE {}",
            fields,
            quote_identifier(&spec.measurement),
            condition
        );

        if let Some((_, interval)) = window.both() {
            query.push_str(&format!(" GROUP BY time({})", interval));
        }

        if !self.timezone.is_empty() {
            query.push_str(&format!(" TZ('{}')", escape_influxql_literal(self.timezone)));
        }

        tracing::debug!(
            measurement = %spec.measurement,
            fields = spec.fields.len(),
            grouped = window.both().is_some(),
            "built InfluxQL query"
        );

        Ok(query)
    }
}

fn time_condition(range: &TimeRange) -> String {
    format!("time >= '{}' AND time < '{}'", range.start, range.end)
}

fn tags_condition(spec: &QuerySpec) -> String {
    spec.tag_filters()
        .map(|(key, value)| {
            format!("{} = '{}'", quote_identifier(key), escape_influxql_literal(value))
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::QueryError;
    use crate::query::spec::QuerySpecBuilder;
    use chrono::{FixedOffset, TimeZone};

    fn day() -> TimeRange {
        TimeRange::day(2026, 2, 1).unwrap()
    }

    fn base(fields: &[&str]) -> QuerySpecBuilder {
        QuerySpec::select("m", fields.iter().copied()).time_range(day())
    }

    #[test]
    fn test_aggregated_query() {
        let spec = base(&["f1", "f2"]).tag("k", "v").window("5m", "mean").build();
        let query = build_influxql_query(&spec, "UTC").unwrap();

        assert!(query.contains("SELECT mean(\"f1\"), mean(\"f2\")"));
        assert!(query.contains("FROM \"m\""));
        assert!(query.contains("GROUP BY time(5m)"));
        assert!(query.ends_with(" TZ('UTC')"));
        assert_eq!(
            query,
            "SELECT mean(\"f1\"), mean(\"f2\") FROM \"m\" \
             WHERE time >= '2026-02-01T00:00:00Z' AND time < '2026-02-02T00:00:00Z' \
             AND \"k\" = 'v' GROUP BY time(5m) TZ('UTC')"
        );
    }

    #[test]
    fn test_plain_query() {
        let spec = base(&["f1"]).build();
        let query = InfluxQlQuery::new(&spec).render().unwrap();

        assert_eq!(
            query,
            "SELECT \"f1\" FROM \"m\" \
             WHERE time >= '2026-02-01T00:00:00Z' AND time < '2026-02-02T00:00:00Z' TZ('UTC')"
        );
    }

    #[test]
    fn test_escapes_string_inputs() {
        let spec = QuerySpec::select("m\"1", ["f\"1"])
            .time_range(day())
            .tag("k'1", "v'1")
            .build();
        let query = build_influxql_query(&spec, "Europe/Zurich").unwrap();

        assert!(query.contains("FROM \"m\\\"1\""));
        assert!(query.contains("\"f\\\"1\""));
        assert!(query.contains("\"k'1\" = 'v\\'1'"));
        assert!(query.ends_with(" TZ('Europe/Zurich')"));
    }

    #[test]
    fn test_timezone_is_escaped_or_omitted() {
        let spec = base(&["f1"]).build();

        let query = build_influxql_query(&spec, "x') DROP").unwrap();
        assert!(query.ends_with(" TZ('x\\') DROP')"));

        let query = build_influxql_query(&spec, "").unwrap();
        assert!(!query.contains("TZ("));
        assert!(query.ends_with("time < '2026-02-02T00:00:00Z'"));
    }

    #[test]
    fn test_tags_in_supplied_order() {
        let spec = base(&["f1"])
            .tag("region", "eu")
            .tag("host", "a")
            .tag("app", "db")
            .build();
        let query = build_influxql_query(&spec, "").unwrap();

        assert!(query.ends_with(
            "AND \"region\" = 'eu' AND \"host\" = 'a' AND \"app\" = 'db'"
        ));
    }

    #[test]
    fn test_partial_window_is_omitted() {
        // aggregation alone still wraps the fields but emits no GROUP BY
        let spec = base(&["f1"]).aggregation("max").build();
        let query = build_influxql_query(&spec, "").unwrap();
        assert!(query.starts_with("SELECT max(\"f1\") FROM"));
        assert!(!query.contains("GROUP BY"));

        let spec = base(&["f1"]).interval("1h").build();
        let query = build_influxql_query(&spec, "").unwrap();
        assert!(query.starts_with("SELECT \"f1\" FROM"));
        assert!(!query.contains("GROUP BY"));
    }

    #[test]
    fn test_rejects_bad_aggregation() {
        let spec = base(&["f1"]).window("5m", "mean()").build();
        assert_eq!(
            build_influxql_query(&spec, "UTC"),
            Err(QueryError::InvalidIdentifier("mean()".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_interval() {
        let spec = base(&["f1"]).window("5m); drop()", "mean").build();
        assert_eq!(
            build_influxql_query(&spec, "UTC"),
            Err(QueryError::InvalidInterval("5m); drop()".to_string()))
        );
    }

    #[test]
    fn test_empty_fields_are_not_rejected() {
        let spec = base(&[]).build();
        let query = build_influxql_query(&spec, "").unwrap();
        assert!(query.starts_with("SELECT  FROM \"m\""));
    }

    #[test]
    fn test_aware_range_keeps_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let spec = QuerySpec::select("m", ["f1"])
            .range(
                tz.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
                tz.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap(),
            )
            .build();
        let query = build_influxql_query(&spec, "").unwrap();

        assert!(query.contains(
            "time >= '2026-02-01T00:00:00+01:00' AND time < '2026-02-02T00:00:00+01:00'"
        ));
    }
}
