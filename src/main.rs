use clap::Parser;
use scrapekeep::config::ScraperConfig;
use scrapekeep::{ContentStore, Scraper, export, utils};
use std::error::Error;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    }
    .apply_env();
    if let Some(store) = args.store {
        config.store_path = store;
    }

    let store = ContentStore::open(&config.store_path).await?;

    match args.command {
        Command::Scrape {
            url,
            selector,
            fetcher,
            timeout,
        } => {
            if let Some(fetcher) = fetcher {
                config.fetcher = fetcher.into();
            }
            if let Some(timeout) = timeout {
                config.fetch_timeout_secs = timeout;
            }

            let scraper = Scraper::new(scrapekeep::fetcher_from_config(&config)?, store)
                .with_fetch_timeout(config.fetch_timeout_secs);
            let outcome = scraper.scrape(&url, &selector).await?;
            println!(
                "Stored {} items from {} (record {})",
                outcome.items.len(),
                url,
                outcome.record_id
            );
        }
        Command::List { json } => {
            if json {
                println!("{}", export::to_json(&store.all().await?)?);
            } else {
                let entries = store.entries().await?;
                if entries.is_empty() {
                    println!("No content available");
                }
                for entry in entries {
                    println!("{}\t{}", entry.id, utils::preview(&entry.item.text, 80));
                }
            }
        }
        Command::Update { id, content } => {
            store.update_item(&id, &content).await?;
            println!("Updated {}", id);
        }
        Command::Delete { id } => {
            store.delete_item(&id).await?;
            println!("Deleted {}", id);
        }
        Command::Clear => {
            store.clear().await?;
            println!("Store cleared");
        }
        Command::Export { output } => {
            let count = export::write_snapshot(&store, &output).await?;
            println!("Exported {} records to {}", count, output.display());
        }
    }

    Ok(())
}
