use clap::{Parser, Subcommand, ValueEnum};
use scrapekeep::config::FetcherKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scrapekeep")]
#[command(about = "Scrape page fragments by CSS selector and keep them per URL")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store file (overrides config and SCRAPE_STORE_PATH)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a page and store the fragments matching a selector
    Scrape {
        /// Page URL (http or https)
        url: String,

        /// CSS selector picking the fragments to keep
        selector: String,

        /// Fetcher to use (overrides config)
        #[arg(short, long, value_enum)]
        fetcher: Option<FetcherArg>,

        /// Fetch timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List stored items, newest record first
    List {
        /// Print the records as JSON instead of one line per item
        #[arg(long)]
        json: bool,
    },

    /// Replace the markup of one item
    Update {
        /// Item identifier as shown by `list`
        id: String,

        /// New markup for the item
        content: String,
    },

    /// Delete one item
    Delete {
        /// Item identifier as shown by `list`
        id: String,
    },

    /// Delete everything in the store
    Clear,

    /// Write all records to a JSON file
    Export {
        /// Destination file
        #[arg(short, long, default_value = scrapekeep::export::DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FetcherArg {
    Http,
    Webdriver,
}

impl From<FetcherArg> for FetcherKind {
    fn from(arg: FetcherArg) -> Self {
        match arg {
            FetcherArg::Http => FetcherKind::Http,
            FetcherArg::Webdriver => FetcherKind::WebDriver,
        }
    }
}
