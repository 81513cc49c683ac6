use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{CatalogApi, CatalogClient, DetailController, ListController, SearchController};
use shared::display::DESCRIPTION_LANGUAGE;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(about = "Browse the creature catalog from a terminal")]
struct Args {
    /// Overrides the configured API base url.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true, default_value = config::CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One page of the catalog (pages are zero-based).
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// One entry by id or name.
    Show {
        key: String,
        #[arg(long, default_value = DESCRIPTION_LANGUAGE)]
        lang: String,
    },
    /// Entries whose name contains the query.
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config);
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    info!(base_url = %settings.base_url, "browser: starting");
    let api: Arc<dyn CatalogApi> = Arc::new(CatalogClient::with_settings(&settings)?);

    match args.command {
        Command::List { page, page_size } => {
            let list = ListController::spawn(api, page_size.unwrap_or(settings.page_size));
            let mut snapshot = list.settled().await;
            if page > 0 && snapshot.error.is_none() {
                list.go_to_page(page);
                snapshot = list.settled().await;
                if snapshot.page.page_index != page {
                    bail!(
                        "page {page} is out of range; the catalog has {} pages",
                        snapshot.total_pages()
                    );
                }
            }
            if let Some(error) = snapshot.error {
                bail!(error);
            }
            print!(
                "{}",
                render::render_page(&snapshot.page, snapshot.entities.as_slice())
            );
        }
        Command::Show { key, lang } => {
            let detail = DetailController::spawn(api, key);
            let snapshot = detail.settled().await;
            if let Some(error) = snapshot.error {
                bail!(error);
            }
            let Some(entity) = snapshot.entity else {
                bail!("no entry key given");
            };
            print!(
                "{}",
                render::render_detail(&entity, snapshot.localization.as_deref(), &lang)
            );
        }
        Command::Search { query } => {
            let search = SearchController::spawn(api, &settings);
            search.set_query(query);
            let snapshot = search.settled().await;
            if let Some(error) = snapshot.error {
                bail!(error);
            }
            print!(
                "{}",
                render::render_results(&snapshot.query.settled_query, snapshot.results.as_slice())
            );
        }
    }

    Ok(())
}
