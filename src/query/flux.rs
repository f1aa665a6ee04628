//! Flux assembler
//!
//! Produces a pipeline, one stage per line:
//!
//! ```text
//! from(bucket: "<bucket>")
//!   |> range(start: <start>, stop: <end>)
//!   |> filter(fn: (r) => r._measurement == "<measurement>")
//!   |> filter(fn: (r) => r._field == "<f1>" or r._field == "<f2>")
//!   |> filter(fn: (r) => r["<tag>"] == "<value>")
//!   |> aggregateWindow(every: <interval>, fn: <aggregation>, createEmpty: false)
//!   |> yield(name: "result")
//! ```

use crate::query::error::QueryResult;
use crate::query::escape::escape_flux_string;
use crate::query::spec::QuerySpec;

const PIPE: &str = "  |> ";

/// Name given to the terminal `yield`
pub const RESULT_NAME: &str = "result";

/// Build a Flux query reading `spec` from `bucket`
pub fn build_flux_query(bucket: &str, spec: &QuerySpec) -> QueryResult<String> {
    FluxQuery::new(bucket, spec).render()
}

/// Flux renderer over a borrowed [`QuerySpec`]
#[derive(Debug, Clone, Copy)]
pub struct FluxQuery<'a> {
    bucket: &'a str,
    spec: &'a QuerySpec,
}

impl<'a> FluxQuery<'a> {
    pub fn new(bucket: &'a str, spec: &'a QuerySpec) -> Self {
        Self { bucket, spec }
    }

    /// Validate and assemble the pipeline
    pub fn render(&self) -> QueryResult<String> {
        let spec = self.spec;
        let window = spec.window()?;

        let mut stages = vec![
            format!("range(start: {}, stop: {})", spec.time_range.start, spec.time_range.end),
            format!(
                "filter(fn: (r) => r._measurement == \"{}\")",
                escape_flux_string(&spec.measurement)
            ),
            format!("filter(fn: (r) => {})", field_predicate(&spec.fields)),
        ];

        for (key, value) in spec.tag_filters() {
            stages.push(format!(
                "filter(fn: (r) => r[\"{}\"] == \"{}\")",
                escape_flux_string(key),
                escape_flux_string(value)
            ));
        }

        if let Some((aggregation, interval)) = window.both() {
            stages.push(format!(
                "aggregateWindow(every: {}, fn: {}, createEmpty: false)",
                interval, aggregation
            ));
        }

        stages.push(format!("yield(name: \"{}\")", RESULT_NAME));

        let mut query = format!("from(bucket: \"{}\")", escape_flux_string(self.bucket));
        for stage in &stages {
            query.push('\n');
            query.push_str(PIPE);
            query.push_str(stage);
        }

        tracing::debug!(
            bucket = %self.bucket,
            measurement = %spec.measurement,
            stages = stages.len() + 1,
            "built Flux query"
        );

        Ok(query)
    }
}

fn field_predicate(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| format!("r._field == \"{}\"", escape_flux_string(f)))
        .collect::<Vec<_>>()
        .join(" or ")
}
