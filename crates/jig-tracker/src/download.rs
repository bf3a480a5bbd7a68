use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use jig_api::ExcelExport;
use std::path::PathBuf;

use crate::app::{create_spinner, require_jig, App};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// Every part of the jig
    All,
    /// Purchase recommendations
    Recommended,
    /// Parts in shortage
    Shortage,
}

impl From<ExportKind> for ExcelExport {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::All => ExcelExport::AllParts,
            ExportKind::Recommended => ExcelExport::Recommended,
            ExportKind::Shortage => ExcelExport::Shortage,
        }
    }
}

#[derive(Args, Debug)]
#[command(about = "Download an Excel export for a tester jig")]
pub struct DownloadArgs {
    /// Tester jig number
    pub jig: String,

    /// Which export to fetch
    #[arg(short, long, value_enum, default_value = "all")]
    pub kind: ExportKind,

    /// Save to this file or directory instead of opening in the browser
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the download URL only
    #[arg(long, conflicts_with = "output")]
    pub print_url: bool,
}

pub fn execute(args: DownloadArgs, app: &App) -> Result<()> {
    let jig_number = require_jig(&args.jig)?;
    let export = ExcelExport::from(args.kind);
    let client = app.client()?;

    let Some(output) = args.output else {
        let url = client.download_url(export, &jig_number)?;
        if args.print_url {
            println!("{url}");
        } else {
            open::that(&url).with_context(|| format!("Failed to open {url}"))?;
            println!("Opened {}", url.cyan());
        }
        return Ok(());
    };

    let dest = if output.is_dir() {
        output.join(export.default_file_name(&jig_number))
    } else {
        output
    };

    let spinner = create_spinner(format!("Downloading {}...", dest.display()));
    let written = client.download_excel(export, &jig_number, &dest);
    spinner.finish_and_clear();

    println!(
        "{} {} ({} bytes)",
        "Saved".green(),
        dest.display(),
        written?
    );
    Ok(())
}
