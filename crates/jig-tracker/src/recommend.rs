use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jig_core::{group_by_sale_order, sorted_parts};
use std::collections::BTreeMap;
use std::io;

use crate::app::{create_spinner, require_jig, App};
use crate::render::{self, OutputFormat};

#[derive(Args, Debug)]
#[command(about = "Show purchase recommendations grouped by sale order")]
pub struct RecommendArgs {
    /// Tester jig number
    pub jig: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub fn execute(args: RecommendArgs, app: &App) -> Result<()> {
    let jig_number = require_jig(&args.jig)?;
    let client = app.client()?;

    let spinner = create_spinner(format!("Fetching recommendations for {jig_number}..."));
    let parts = client.recommend_purchase(&jig_number);
    spinner.finish_and_clear();

    let Some(parts) = parts? else {
        println!("{}", "No recommendation data available for this jig.".yellow());
        return Ok(());
    };
    app.remember(&jig_number);

    let groups = group_by_sale_order(&sorted_parts(&parts));
    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Human => render::write_recommendations(stdout, &groups)?,
        OutputFormat::Json => {
            let wording = app.settings.adequate_wording;
            let rows: BTreeMap<_, _> = groups
                .iter()
                .map(|(sale_order, parts)| (sale_order, render::part_rows(parts, wording)))
                .collect();
            render::write_json(stdout, &rows)?
        }
    }
    Ok(())
}
