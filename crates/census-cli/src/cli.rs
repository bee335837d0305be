//! CLI argument definitions for the census explorer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use census_model::{NumericRange, SetDimension};

#[derive(Parser)]
#[command(
    name = "census-explorer",
    version,
    about = "Census Explorer - Browse geographic statistics by state, county and ZIP code",
    long_about = "Browse census statistics at state, county and ZIP code level.\n\n\
                  Drill into a state or county, filter by region, district, urban/rural\n\
                  status and numeric ranges, and compare metrics between years."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Configuration file (default: the per-user config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding `data/` and the manifest.
    #[arg(long = "data-root", value_name = "DIR", global = true)]
    pub data_root: Option<PathBuf>,

    /// Deployment sub-path prepended to every resource path.
    #[arg(long = "base-prefix", value_name = "PREFIX", global = true)]
    pub base_prefix: Option<String>,

    /// Serve resources from this URL instead of the data root.
    #[cfg(feature = "http")]
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Do not load the next level ahead of time.
    #[arg(long = "no-prefetch", global = true)]
    pub no_prefetch: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the datasets in the manifest.
    Datasets,

    /// Show the rows of a dataset at the chosen level after filtering.
    Show(ShowArgs),

    /// List the options offered for every filter dimension.
    Options(ScopeArgs),

    /// Print the effective configuration as TOML.
    Config,
}

/// Which rows to look at: dataset, year, metric, position and filters.
#[derive(Args)]
pub struct ScopeArgs {
    /// Dataset handle or file name (default: last used, then the first listed).
    #[arg(value_name = "DATASET")]
    pub dataset: Option<String>,

    /// Data year (default: newest).
    #[arg(long = "year")]
    pub year: Option<String>,

    /// Metric column (default: first metric of the year).
    #[arg(long = "metric")]
    pub metric: Option<String>,

    /// Drill into a state to list its counties.
    #[arg(long = "state", value_name = "NAME")]
    pub state: Option<String>,

    /// Drill into a county of `--state` to list its ZIP codes.
    #[arg(long = "county", value_name = "NAME", requires = "state")]
    pub county: Option<String>,

    /// Restrict a dimension, e.g. `region=South,West`. Repeatable.
    #[arg(long = "filter", value_name = "DIMENSION=VALUES", value_parser = parse_filter)]
    pub filters: Vec<FilterArg>,

    #[arg(long = "min-population")]
    pub min_population: Option<f64>,

    #[arg(long = "max-population")]
    pub max_population: Option<f64>,

    /// Minimum land area in km².
    #[arg(long = "min-area")]
    pub min_area: Option<f64>,

    /// Maximum land area in km².
    #[arg(long = "max-area")]
    pub max_area: Option<f64>,

    /// Minimum value of the selected metric.
    #[arg(long = "min-value")]
    pub min_value: Option<f64>,

    /// Maximum value of the selected metric.
    #[arg(long = "max-value")]
    pub max_value: Option<f64>,

    /// Case-insensitive text search over place names.
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,
}

impl ScopeArgs {
    pub fn population(&self) -> NumericRange {
        NumericRange::new(self.min_population, self.max_population)
    }

    pub fn land_area(&self) -> NumericRange {
        NumericRange::new(self.min_area, self.max_area)
    }

    pub fn metric_value(&self) -> NumericRange {
        NumericRange::new(self.min_value, self.max_value)
    }
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Sort by this column (ascending unless `--desc`).
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort descending.
    #[arg(long = "desc", requires = "sort")]
    pub desc: bool,

    /// Year to compare the metric against (default: the previous year).
    #[arg(long = "compare-year", value_name = "YEAR")]
    pub compare_year: Option<String>,

    /// Maximum number of rows to print (0 for all).
    #[arg(long = "limit", default_value_t = 25)]
    pub limit: usize,
}

/// One `--filter DIMENSION=VALUES` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub dimension: SetDimension,
    pub values: Vec<String>,
}

/// Parse `region=South,West` into a dimension and its values.
pub fn parse_filter(input: &str) -> Result<FilterArg, String> {
    let (dimension, values) = input
        .split_once('=')
        .ok_or_else(|| format!("expected DIMENSION=VALUES, got '{input}'"))?;
    let dimension: SetDimension = dimension.parse().map_err(|err| format!("{err}"))?;
    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        return Err(format!("no values given for {dimension}"));
    }
    Ok(FilterArg { dimension, values })
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let arg = parse_filter("urban-rural=Urban, Rural").unwrap();
        assert_eq!(arg.dimension, SetDimension::UrbanRural);
        assert_eq!(arg.values, vec!["Urban", "Rural"]);
    }

    #[test]
    fn test_parse_filter_rejects_bad_input() {
        assert!(parse_filter("region").is_err());
        assert!(parse_filter("region=").is_err());
        assert!(parse_filter("planet=Mars").is_err());
    }

    #[test]
    fn test_cli_parses_show() {
        let cli = Cli::try_parse_from([
            "census-explorer",
            "show",
            "census2024",
            "--state",
            "Texas",
            "--filter",
            "congressional_district=7,10",
            "--min-population",
            "1000",
            "--sort",
            "county_name",
            "--desc",
        ])
        .unwrap();
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.scope.dataset.as_deref(), Some("census2024"));
        assert_eq!(args.scope.state.as_deref(), Some("Texas"));
        assert_eq!(args.scope.filters.len(), 1);
        assert_eq!(args.scope.population(), NumericRange::at_least(1000.0));
        assert!(args.desc);
        assert_eq!(args.limit, 25);
    }

    #[test]
    fn test_county_requires_state() {
        assert!(Cli::try_parse_from(["census-explorer", "show", "--county", "Travis County"]).is_err());
    }
}
