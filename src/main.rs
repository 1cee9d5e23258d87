use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ducksearch::api::create_router;
use ducksearch::config::Config;
use ducksearch::render::render_outcome;
use ducksearch::search_client::SearchClient;
use ducksearch::session::SearchSession;

#[derive(Parser, Debug)]
#[command(name = "ducksearch", about = "Query a search service and show ranked results")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one query and print the ranked results
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// 1-based result page
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
        /// Print the outcome as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Serve ranked results over HTTP
    Serve {
        #[arg(short, long)]
        bind: Option<std::net::SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // fmt subscriber also picks up `log` records from the library
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let client = SearchClient::new(config.client.clone()).context("Failed to create search client")?;

    match cli.command {
        Command::Search { query, page, json } => {
            let session = SearchSession::new(client);
            let query = query.join(" ");
            let outcome = session
                .submit_page(&query, page)
                .await
                .with_context(|| format!("Search for {query:?} failed"))?;

            // a single query is never superseded
            let Some(outcome) = outcome else {
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_outcome(&outcome));
            }
        }
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(config.bind);
            let app = create_router(Arc::new(client));
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {bind}"))?;
            tracing::info!("listening on {}", bind);
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
