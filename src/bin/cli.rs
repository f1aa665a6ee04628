//! influx-query CLI
//!
//! Prints InfluxQL or Flux query strings built from command line arguments.
//! Nothing is sent anywhere; pipe the output into the database client of
//! your choice.

use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use influx_query::config::{generate_default_config, Config};
use influx_query::query::{
    build_flux_query, build_influxql_query, QuerySpec, QuerySpecBuilder, Timestamp,
};

#[derive(Parser)]
#[command(name = "influx-query")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build injection-safe InfluxQL and Flux query strings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an InfluxQL query
    Influxql {
        #[command(flatten)]
        query: QueryArgs,
        /// Timezone for the TZ() clause, empty to omit (default: from config)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Build a Flux query
    Flux {
        #[command(flatten)]
        query: QueryArgs,
        /// Bucket to read from (default: from config)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Measurement name
    pub measurement: String,
    /// Fields to select (repeat or comma-separate)
    #[arg(short, long = "field", required = true)]
    pub fields: Vec<String>,
    /// Range start, ISO 8601 (naive timestamps are UTC)
    #[arg(long)]
    pub start: Option<String>,
    /// Range end, ISO 8601 (default: now)
    #[arg(long)]
    pub end: Option<String>,
    /// Relative range when --start is not given (e.g. 30min, 6h, 7d, 2w)
    #[arg(short, long, default_value = "1h")]
    pub last: String,
    /// Tag filters in key=value format, applied in order
    #[arg(short = 'T', long = "tag")]
    pub tags: Vec<String>,
    /// Window interval, e.g. 5m
    #[arg(short, long)]
    pub interval: Option<String>,
    /// Aggregation function, e.g. mean
    #[arg(short, long)]
    pub aggregation: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    influx_query::logging::init(&config.logging);

    let (language, query) = match cli.command {
        Commands::Influxql { query, timezone } => {
            let spec = build_spec(&query)?;
            let timezone = timezone.unwrap_or_else(|| config.influxql.timezone.clone());
            ("influxql", build_influxql_query(&spec, &timezone)?)
        }

        Commands::Flux { query, bucket } => {
            let Some(bucket) = bucket.or_else(|| config.flux.bucket.clone()) else {
                bail!("No bucket given. Use --bucket or set [flux] bucket in the config");
            };
            let spec = build_spec(&query)?;
            ("flux", build_flux_query(&bucket, &spec)?)
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
            return Ok(());
        }
    };

    match cli.format.as_str() {
        "json" => {
            let body = serde_json::json!({
                "language": language,
                "query": query,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        _ => println!("{}", query),
    }

    Ok(())
}

fn build_spec(args: &QueryArgs) -> anyhow::Result<QuerySpec> {
    // Flatten fields (support comma-separated)
    let fields: Vec<String> = args
        .fields
        .iter()
        .flat_map(|f| f.split(',').map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect();

    let end = match &args.end {
        Some(s) => s.parse::<Timestamp>()?,
        None => Utc::now().into(),
    };
    let start = match &args.start {
        Some(s) => s.parse::<Timestamp>()?,
        None => {
            let last = parse_duration(&args.last)?;
            let start = match end {
                Timestamp::Naive(dt) => dt.checked_sub_signed(last).map(Timestamp::Naive),
                Timestamp::Aware(dt) => dt.checked_sub_signed(last).map(Timestamp::Aware),
            };
            start.with_context(|| format!("Invalid duration: --last {} reaches too far back", args.last))?
        }
    };

    let mut builder: QuerySpecBuilder =
        QuerySpec::select(args.measurement.clone(), fields).range(start, end);

    for tag in &args.tags {
        let (k, v) = parse_tag(tag)?;
        builder = builder.tag(k, v);
    }
    if let Some(interval) = &args.interval {
        builder = builder.interval(interval.clone());
    }
    if let Some(aggregation) = &args.aggregation {
        builder = builder.aggregation(aggregation.clone());
    }

    Ok(builder.build())
}

fn parse_tag(s: &str) -> anyhow::Result<(String, String)> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => bail!("Invalid tag {:?}. Use key=value", s),
    }
}

fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim().to_lowercase();
    let parse = |n: &str| -> anyhow::Result<i64> {
        n.parse()
            .with_context(|| format!("Invalid duration format: {}. Use: 30min, 6h, 7d, 2w", s))
    };

    let duration = if let Some(minutes) = s.strip_suffix("min") {
        Duration::try_minutes(parse(minutes)?)
    } else if let Some(hours) = s.strip_suffix('h') {
        Duration::try_hours(parse(hours)?)
    } else if let Some(days) = s.strip_suffix('d') {
        Duration::try_days(parse(days)?)
    } else if let Some(weeks) = s.strip_suffix('w') {
        Duration::try_weeks(parse(weeks)?)
    } else {
        bail!("Invalid duration format: {}. Use: 30min, 6h, 7d, 2w", s)
    };

    duration.with_context(|| format!("Invalid duration: {} is out of range", s))
}
