//! Query input shared by both assemblers
//!
//! A [`QuerySpec`] describes *what* to read: one measurement, a list of fields,
//! a time range, optional tag equality filters and an optional
//! aggregation/interval pair. The InfluxQL and Flux assemblers turn the same
//! spec into their own grammar.

use chrono::{Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::query::error::QueryResult;
use crate::query::escape::{validate_identifier, validate_interval};
use crate::query::time::{TimeRange, Timestamp};

/// Everything needed to build a query, independent of the target language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Measurement to read from
    pub measurement: String,
    /// Fields to select, in output order
    pub fields: Vec<String>,
    /// Time range to query
    pub time_range: TimeRange,
    /// Tag equality filters, in output order. `None` and an empty map both
    /// mean "no tag filters".
    #[serde(default)]
    pub tags: Option<IndexMap<String, String>>,
    /// Window size such as `5m`
    #[serde(default)]
    pub interval: Option<String>,
    /// Aggregation function name such as `mean`
    #[serde(default)]
    pub aggregation: Option<String>,
}

/// Validated bare tokens of a spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    /// Aggregation function, already checked against the identifier grammar
    pub aggregation: Option<&'a str>,
    /// Interval token, already checked against the interval grammar
    pub interval: Option<&'a str>,
}

impl<'a> Window<'a> {
    /// The `(aggregation, interval)` pair, only if both are present
    pub fn both(&self) -> Option<(&'a str, &'a str)> {
        match (self.aggregation, self.interval) {
            (Some(agg), Some(every)) => Some((agg, every)),
            _ => None,
        }
    }
}

impl QuerySpec {
    /// Start building a spec for `measurement` selecting `fields`
    pub fn select<I, S>(measurement: impl Into<String>, fields: I) -> QuerySpecBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuerySpecBuilder::new(measurement, fields)
    }

    /// Tag filters in insertion order (empty when absent)
    pub fn tag_filters(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tags
            .iter()
            .flat_map(|tags| tags.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether any tag filter will be emitted
    pub fn has_tags(&self) -> bool {
        self.tags.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Validate the aggregation and interval tokens.
    ///
    /// Empty strings count as absent. Every supplied token is checked, the
    /// aggregation first, even when its partner is missing.
    pub fn window(&self) -> QueryResult<Window<'_>> {
        let aggregation = non_empty(&self.aggregation)
            .map(validate_identifier)
            .transpose()?;
        let interval = non_empty(&self.interval)
            .map(validate_interval)
            .transpose()?;

        let window = Window {
            aggregation,
            interval,
        };

        if window.both().is_none() && (aggregation.is_some() || interval.is_some()) {
            tracing::warn!(
                measurement = %self.measurement,
                aggregation = ?aggregation,
                interval = ?interval,
                "aggregation and interval must both be set; window clause omitted"
            );
        }

        Ok(window)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Builder for [`QuerySpec`]
#[derive(Debug, Clone)]
pub struct QuerySpecBuilder {
    measurement: String,
    fields: Vec<String>,
    time_range: Option<TimeRange>,
    tags: Option<IndexMap<String, String>>,
    interval: Option<String>,
    aggregation: Option<String>,
}

impl QuerySpecBuilder {
    /// Create a new builder for a measurement and its fields
    pub fn new<I, S>(measurement: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            measurement: measurement.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            time_range: None,
            tags: None,
            interval: None,
            aggregation: None,
        }
    }

    /// Set an explicit time range
    pub fn time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Query `[start, end)`
    pub fn range(self, start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        self.time_range(TimeRange::new(start, end))
    }

    /// Query the last N hours up to now (UTC).
    ///
    /// A span that cannot be represented leaves the range unchanged.
    pub fn last_hours(self, hours: i64) -> Self {
        self.last(Duration::try_hours(hours), || format!("{hours}h"))
    }

    /// Query the last N days up to now (UTC).
    ///
    /// A span that cannot be represented leaves the range unchanged.
    pub fn last_days(self, days: i64) -> Self {
        self.last(Duration::try_days(days), || format!("{days}d"))
    }

    fn last(self, span: Option<Duration>, describe: impl FnOnce() -> String) -> Self {
        let end = Utc::now();
        match span.and_then(|span| end.checked_sub_signed(span)) {
            Some(start) => self.range(start, end),
            None => {
                tracing::warn!(
                    measurement = %self.measurement,
                    span = %describe(),
                    "relative range out of bounds; time range left unchanged"
                );
                self
            }
        }
    }

    /// Add a tag equality filter.
    ///
    /// Re-adding a key replaces its value but keeps its original position.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace all tag filters. An empty iterator still marks tags as present.
    pub fn tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = Some(
            tags.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Set the window interval, e.g. `5m`
    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Set the aggregation function, e.g. `mean`
    pub fn aggregation(mut self, aggregation: impl Into<String>) -> Self {
        self.aggregation = Some(aggregation.into());
        self
    }

    /// Set interval and aggregation together
    pub fn window(self, interval: impl Into<String>, aggregation: impl Into<String>) -> Self {
        self.interval(interval).aggregation(aggregation)
    }

    /// Build the spec. Without an explicit range the last hour is queried.
    pub fn build(self) -> QuerySpec {
        let time_range = match self.time_range {
            Some(range) => range,
            None => {
                let end = Utc::now();
                TimeRange::new(end - Duration::hours(1), end)
            }
        };

        QuerySpec {
            measurement: self.measurement,
            fields: self.fields,
            time_range,
            tags: self.tags,
            interval: self.interval,
            aggregation: self.aggregation,
        }
    }
}
