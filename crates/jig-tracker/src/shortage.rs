use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jig_core::{shortages_only, sorted_parts};
use std::io;

use crate::app::{create_spinner, require_jig, App};
use crate::render::{self, OutputFormat};

#[derive(Args, Debug)]
#[command(about = "List parts in shortage for a tester jig")]
pub struct ShortageArgs {
    /// Tester jig number
    pub jig: String,

    /// Ask the backend for the shortage list of one sale order
    #[arg(long, value_name = "SALE_ORDER")]
    pub sale_order: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub fn execute(args: ShortageArgs, app: &App) -> Result<()> {
    let jig_number = require_jig(&args.jig)?;
    let client = app.client()?;

    let spinner = create_spinner(format!("Fetching parts for {jig_number}..."));
    let parts = match args.sale_order.as_deref() {
        Some(sale_order) => client.shortage_list(&jig_number, sale_order),
        None => client.all_parts_for_jig(&jig_number),
    };
    spinner.finish_and_clear();

    let Some(parts) = parts? else {
        println!("{}", "No parts data available for this jig.".yellow());
        return Ok(());
    };
    app.remember(&jig_number);

    let parts = sorted_parts(&parts);
    let shortages = shortages_only(&parts);
    let wording = app.settings.adequate_wording;

    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Human => render::write_shortages(stdout, &parts, &shortages, wording)?,
        OutputFormat::Json => {
            render::write_json(stdout, &render::part_rows(&shortages, wording))?
        }
    }
    Ok(())
}
