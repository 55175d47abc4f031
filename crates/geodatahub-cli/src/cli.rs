use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use geodatahub_core::config::LlmBackendKind;
use std::path::PathBuf;

/// GeoDataHub - search and download geospatial data in plain language
#[derive(Parser, Debug)]
#[command(name = "geodatahub")]
#[command(about = "Search and download geospatial data in plain language", long_about = None)]
#[command(version)]
#[command(after_help = "Examples:
  geodatahub search \"Sentinel-2 images of Paris from January 2024 with less than 20% cloud cover\"
  geodatahub search --product S2_MSI_L2A --location London --start 2024-01-01 --end 2024-01-31
  geodatahub download \"Sentinel-2 images of London from last week\" -o ./data
  geodatahub list providers")]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// LLM backend used to parse queries
    #[arg(long, global = true, value_name = "BACKEND")]
    pub llm: Option<LlmChoice>,

    /// Config file (defaults to ~/.config/geodatahub/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LlmChoice {
    /// First available of Groq, Ollama and OpenRouter
    Auto,
    Groq,
    Ollama,
    #[value(name = "openrouter")]
    OpenRouter,
    /// Rule-based parsing only
    Regex,
}

impl From<LlmChoice> for LlmBackendKind {
    fn from(choice: LlmChoice) -> Self {
        match choice {
            LlmChoice::Auto => LlmBackendKind::Auto,
            LlmChoice::Groq => LlmBackendKind::Groq,
            LlmChoice::Ollama => LlmBackendKind::Ollama,
            LlmChoice::OpenRouter => LlmBackendKind::OpenRouter,
            LlmChoice::Regex => LlmBackendKind::Regex,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for geospatial data
    Search(SearchArgs),

    /// Search, then download the matching products
    Download(DownloadArgs),

    /// List available providers or products
    List(ListArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Natural language query (e.g. "Sentinel-2 images of Paris from last month")
    pub query: Option<String>,

    /// Product type (e.g. S2_MSI_L2A, LANDSAT_C2L2)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Location name, geocoded to a bounding box
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long, short = 's')]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long, short = 'e')]
    pub end: Option<NaiveDate>,

    /// Maximum cloud cover percentage (0-100)
    #[arg(long, short = 'c')]
    pub cloud: Option<f64>,

    /// Bounding box in degrees
    #[arg(
        long,
        short = 'b',
        num_args = 4,
        value_names = ["WEST", "SOUTH", "EAST", "NORTH"],
        allow_negative_numbers = true
    )]
    pub bbox: Option<Vec<f64>>,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value = "10")]
    pub limit: usize,

    /// Search this provider only
    #[arg(long)]
    pub provider: Option<String>,

    /// Save results to a JSON file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SearchArgs {
    /// True when at least one search criterion was given
    pub fn has_criteria(&self) -> bool {
        self.query.is_some()
            || self.product.is_some()
            || self.location.is_some()
            || self.start.is_some()
            || self.end.is_some()
            || self.cloud.is_some()
            || self.bbox.is_some()
            || self.provider.is_some()
    }
}

#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Natural language query
    pub query: String,

    /// Output directory (defaults to the configured download directory)
    #[arg(long = "output-dir", short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of products to download
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(subcommand)]
    pub command: ListCommand,
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// List configured providers
    Providers,

    /// List available product types
    Products {
        /// Only products offered by this provider
        #[arg(long, short = 'p')]
        provider: Option<String>,
    },
}
