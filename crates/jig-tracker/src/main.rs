use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

use jig_tracker::app::App;
use jig_tracker::config::Overrides;
use jig_tracker::{alert, docs, download, history, recommend, search, shortage};

#[derive(Parser)]
#[command(name = "jig")]
#[command(about = "Track tester jig parts availability and launch status", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Backend base URL (overrides JIG_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a tester jig, its parts and launch status
    #[command(alias = "s")]
    Search(search::SearchArgs),

    /// List parts in shortage
    Shortage(shortage::ShortageArgs),

    /// Show purchase recommendations
    Recommend(recommend::RecommendArgs),

    /// Send an alert about a tester jig
    Alert(alert::AlertArgs),

    /// Download an Excel export
    #[command(alias = "dl")]
    Download(download::DownloadArgs),

    /// Search the documentation index
    Docs(docs::DocsArgs),

    /// Open a tester jig's own document
    Manual(docs::ManualArgs),

    /// Show recently searched jig numbers
    History(history::HistoryArgs),

    /// Forget the saved session
    Clear(history::ClearArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug, RUST_LOG wins
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let app = App::load(&Overrides {
        api_url: cli.api_url,
        timeout_secs: cli.timeout,
    })?;

    match cli.command {
        Commands::Search(args) => search::execute(args, &app),
        Commands::Shortage(args) => shortage::execute(args, &app),
        Commands::Recommend(args) => recommend::execute(args, &app),
        Commands::Alert(args) => alert::execute(args, &app),
        Commands::Download(args) => download::execute(args, &app),
        Commands::Docs(args) => docs::execute(args, &app),
        Commands::Manual(args) => docs::execute_manual(args, &app),
        Commands::History(args) => history::execute(args, &app),
        Commands::Clear(args) => history::execute_clear(args, &app),
    }
}
