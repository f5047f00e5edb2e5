use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{self, EnvFilter};

use hadith_search::search::{Segment, highlight};
use hadith_search::{
    Config, HadithClient, HadithSource, RandomSampleRetriever, Record, SearchOrchestrator,
};

#[derive(Parser, Debug)]
#[command(name = "hadith-search", version, about = "Search hadith books of api.hadith.gading.dev")]
struct Cli {
    /// Config file (JSON). Defaults to <config dir>/hadith-search/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available books
    Books,

    /// Search books for records containing every word of the query
    Search {
        /// Words to look for (Arabic or translation)
        #[arg(required = true)]
        query: Vec<String>,

        /// Only search this book id
        #[arg(long)]
        book: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Show a random record with text in both scripts
    Random {
        /// Book id (e.g. bukhari)
        book: String,

        #[arg(long)]
        attempts: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref())?;

    let config = Config::load(cli.config.as_deref())?;
    let client = HadithClient::from_config(&config)?;
    let source: Arc<dyn HadithSource> = Arc::new(client);

    match cli.command {
        Command::Books => list_books(source.as_ref()).await,
        Command::Search {
            query,
            book,
            page,
            per_page,
        } => {
            let per_page = per_page.unwrap_or(config.items_per_page);
            run_search(source, &config, &query.join(" "), book.as_deref(), page, per_page).await
        }
        Command::Random { book, attempts } => {
            let sampler = RandomSampleRetriever::new(source, config.sample_options());
            let attempts = attempts.unwrap_or(config.sample_attempts);
            let record = sampler
                .sample_with_attempts(&book, attempts)
                .await
                .with_context(|| format!("Failed to pick a record from {book}"))?;
            print_record(&record, "");
            Ok(())
        }
    }
}

fn init_logging(
    log_file: Option<&std::path::Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
            Ok(None)
        }
    }
}

async fn list_books(source: &dyn HadithSource) -> Result<()> {
    let books = source
        .list_collections()
        .await
        .context("Failed to load book list")?;

    for book in books {
        println!("{:<12} {:<20} {:>6}", book.id, book.name, book.available_count);
    }
    Ok(())
}

async fn run_search(
    source: Arc<dyn HadithSource>,
    config: &Config,
    query: &str,
    book: Option<&str>,
    page: usize,
    per_page: usize,
) -> Result<()> {
    let books = source
        .list_collections()
        .await
        .context("Failed to load book list")?;

    let orchestrator = SearchOrchestrator::new(source, config.search_options());
    let ticket = orchestrator.ticket();

    // Ctrl-C stops the scan at the next window and keeps what was found
    let token = ticket.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping search");
            token.cancel();
        }
    });

    let state = orchestrator.search(&ticket, query, &books, book).await;
    if let Some(error) = &state.error {
        anyhow::bail!("Search failed: {error}");
    }
    if !state.search_performed {
        println!("Nothing to search for.");
        return Ok(());
    }

    let view = orchestrator.page(page, Some(per_page));
    println!(
        "{} results for '{}' (page {}/{}){}",
        state.total_results,
        query,
        view.current_page,
        view.total_pages,
        if ticket.is_cancelled() { ", interrupted" } else { "" }
    );
    for record in &view.items {
        print_record(record, query);
    }
    Ok(())
}

fn print_record(record: &Record, query: &str) {
    println!();
    println!("== {} #{}", record.collection_name(), record.number());
    println!("{}", marked(&record.contents.primary_text, query));
    println!("{}", marked(&record.contents.translated_text, query));
}

fn marked(text: &str, query: &str) -> String {
    highlight(text, query)
        .into_iter()
        .map(|segment| match segment {
            Segment::Match(m) => format!("[{m}]"),
            Segment::Plain(p) => p.to_string(),
        })
        .collect()
}
