use std::ffi::OsStr;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid log format '{other}', expected one of: human, json"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphKind {
    /// Editor -> next editor over one article's revisions
    EditorTrajectory,
    /// Page -> next page over one editor's contributions
    PageTrajectory,
    /// Article -> article via editors' consecutive edits
    SharedEditing,
    /// Editor -> editor via co-edited pages
    SharedPageEditing,
    /// Page -> page links inside a 1-step neighborhood
    Hyperlink,
    /// Page -> category membership
    Category,
}

impl GraphKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EditorTrajectory => "editor-trajectory",
            Self::PageTrajectory => "page-trajectory",
            Self::SharedEditing => "shared-editing",
            Self::SharedPageEditing => "shared-page-editing",
            Self::Hyperlink => "hyperlink",
            Self::Category => "category",
        }
    }

    pub fn requires_threshold(self) -> bool {
        matches!(self, Self::SharedEditing | Self::SharedPageEditing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DynamicsArgs {
    #[arg(long, help = "Article title; also names the output <title>.csv")]
    pub title: String,

    #[arg(long, help = "JSON array of the article's raw revisions")]
    pub revisions: PathBuf,

    #[arg(long, help = "JSON array of the talk page's raw revisions")]
    pub talk: Option<PathBuf>,

    #[arg(long, help = "Monthly pageview payload ({\"daily_views\": ...})")]
    pub pageviews: Option<PathBuf>,

    #[arg(long, value_parser = parse_iso_date, help = "First day of the frame (YYYY-MM-DD)")]
    pub start: NaiveDate,

    #[arg(long, value_parser = parse_iso_date, help = "Last day of the frame (YYYY-MM-DD)")]
    pub end: NaiveDate,

    #[arg(
        long,
        conflicts_with_all = ["talk", "pageviews"],
        help = "Build the Article/Users/Size frame only"
    )]
    pub metadata_only: bool,

    #[arg(long, help = "Output directory; defaults to [output].dir from config")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct GraphArgs {
    #[arg(value_enum, help = "Graph kind to build")]
    pub kind: GraphKind,

    #[arg(long, help = "JSON input file; shape depends on the graph kind")]
    pub input: PathBuf,

    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Minimum edge weight; required for shared-editing kinds"
    )]
    pub threshold: Option<i64>,

    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Prune the result at this weight (self-loops and isolates removed)"
    )]
    pub prune: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DumpsArgs {
    #[arg(short, long, value_parser = parse_compact_date, help = "Start day (YYYYMMDD); defaults to yesterday")]
    pub start: Option<NaiveDate>,

    #[arg(short, long, value_parser = parse_compact_date, help = "End day (YYYYMMDD); defaults to today")]
    pub end: Option<NaiveDate>,

    #[arg(short, long, help = "Data directory; defaults to [pageviews].data_dir")]
    pub dir: Option<PathBuf>,

    #[arg(long, help = "File with one dump file name per line to select from")]
    pub listing: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Build a daily metrics frame for one article and write it as CSV
    Dynamics(DynamicsArgs),
    /// Build a graph and print its node-link JSON
    Graph(GraphArgs),
    /// Plan a raw pagecount dump download
    Dumps(DumpsArgs),
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Wiki editing dynamics and collaboration graphs")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Workspace root holding .wikidyn/config.toml"
    )]
    pub workspace: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = parse_log_format,
        help = "Log format: human or json"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

pub fn parse_cli() -> Cli {
    let mut args: Vec<_> = std::env::args_os().collect();
    if args.get(1).is_some_and(|arg| arg == OsStr::new("--")) {
        args.remove(1);
    }

    Cli::parse_from(args)
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse()
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

fn parse_compact_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .map_err(|_| format!("invalid date '{value}', expected YYYYMMDD"))
}
