use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io;

use crate::app::App;
use crate::render::{self, OutputFormat};

#[derive(Args, Debug)]
#[command(about = "Show recently searched jig numbers")]
pub struct HistoryArgs {
    /// Forget the search history
    #[arg(long)]
    pub clear: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
#[command(about = "Forget the saved session")]
pub struct ClearArgs {
    /// Also forget the search history
    #[arg(long)]
    pub history: bool,
}

pub fn execute(args: HistoryArgs, app: &App) -> Result<()> {
    if args.clear {
        app.store.clear_history()?;
        println!("Search history cleared");
        return Ok(());
    }

    let history = app.store.load_history()?;
    match args.format {
        OutputFormat::Json => render::write_json(io::stdout().lock(), &history.entries)?,
        OutputFormat::Human if history.is_empty() => println!("{}", "No recent searches".dimmed()),
        OutputFormat::Human => {
            for (idx, jig) in history.entries.iter().enumerate() {
                println!("{:>2}. {jig}", idx + 1);
            }
        }
    }
    Ok(())
}

pub fn execute_clear(args: ClearArgs, app: &App) -> Result<()> {
    let had_session = app.store.clear_session()?;
    if args.history {
        app.store.clear_history()?;
    }
    if had_session {
        println!("Session cleared");
    } else {
        println!("No saved session");
    }
    Ok(())
}
