use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use jig_api::{doc_page_link, jig_document_link};
use std::io;

use crate::app::{create_spinner, require_jig, App};
use crate::render::{self, OutputFormat};

#[derive(Args, Debug)]
#[command(about = "Search the documentation index")]
pub struct DocsArgs {
    /// Text to search for (at least 3 characters)
    pub query: String,

    /// Open the Nth hit in the browser
    #[arg(long, value_name = "N")]
    pub open: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
#[command(about = "Open a tester jig's own document")]
pub struct ManualArgs {
    /// Tester jig number
    pub jig: String,

    /// Document type, e.g. manual or schematic
    #[arg(long, default_value = "manual")]
    pub doc_type: String,

    /// Print the document URL only
    #[arg(long)]
    pub print_url: bool,
}

pub fn execute(args: DocsArgs, app: &App) -> Result<()> {
    let client = app.client()?;

    let spinner = create_spinner(format!("Searching documents for '{}'...", args.query.trim()));
    let hits = client.search_docs(&args.query);
    spinner.finish_and_clear();
    let hits = hits?;

    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Human => render::write_doc_hits(stdout, client.base_url(), &hits)?,
        OutputFormat::Json => render::write_json(stdout, &hits)?,
    }

    if let Some(n) = args.open {
        let Some(hit) = n.checked_sub(1).and_then(|idx| hits.get(idx)) else {
            bail!("No hit number {n}; the search returned {}", hits.len());
        };
        let url = doc_page_link(client.base_url(), hit);
        open::that(&url).with_context(|| format!("Failed to open {url}"))?;
    }
    Ok(())
}

pub fn execute_manual(args: ManualArgs, app: &App) -> Result<()> {
    let jig_number = require_jig(&args.jig)?;
    let doc_type = args.doc_type.trim();
    if doc_type.is_empty() {
        bail!("Document type must not be empty");
    }

    let url = jig_document_link(&app.settings.api_url, &jig_number, doc_type);
    if args.print_url {
        println!("{url}");
    } else {
        open::that(&url).with_context(|| format!("Failed to open {url}"))?;
        println!("Opened {}", url.cyan());
    }
    Ok(())
}
