use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use jig_api::AlertChannel;
use jig_core::{normalize_jig_number, LaunchMode};
use std::io;
use std::sync::Arc;

use crate::app::{create_spinner, App};
use crate::render::{self, OutputFormat, SessionReport};
use crate::session::{JigTracker, LaunchSource, NotificationState, TrackerOptions};
use crate::store::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

#[derive(Args, Debug)]
#[command(about = "Look up a tester jig, its parts and launch status")]
pub struct SearchArgs {
    /// Tester jig number (defaults to the last searched jig)
    pub jig: Option<String>,

    /// Set the launch status by hand instead of deriving it from parts
    #[arg(long, value_enum)]
    pub launched: Option<Answer>,

    /// Channel for the shortage alert (telegram, whatsapp)
    #[arg(long)]
    pub channel: Option<AlertChannel>,

    /// Do not send an alert when the jig is not launched
    #[arg(long)]
    pub no_alert: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub fn execute(args: SearchArgs, app: &App) -> Result<()> {
    let input = match args.jig {
        Some(jig) => jig,
        None => match app.store.load_session() {
            Some(snapshot) => {
                eprintln!("Resuming last search: {}", snapshot.jig_number.bold());
                snapshot.jig_number
            }
            None => bail!("No jig number given and no previous search to resume"),
        },
    };

    let launch = match (args.launched, app.settings.launch_mode) {
        (Some(answer), _) => LaunchSource::Operator(answer == Answer::Yes),
        (None, LaunchMode::Auto) => LaunchSource::Derived,
        (None, LaunchMode::Manual) => {
            bail!("Launch mode is manual: pass --launched yes or --launched no")
        }
    };
    let options = TrackerOptions {
        launch,
        alert_channel: args.channel.unwrap_or(app.settings.alert_channel),
        notify: !args.no_alert,
    };

    let client = Arc::new(app.client()?);
    let mut tracker = JigTracker::new(client.clone(), client, options);
    tracker.search(&input)?;

    let spinner = create_spinner(format!("Searching {}...", input.trim()));
    let result = tracker.wait(app.wait_budget(2));
    spinner.finish_and_clear();
    let session = result?;

    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Human => {
            render::write_session(stdout, session, app.settings.adequate_wording)?
        }
        OutputFormat::Json => render::write_json(
            stdout,
            &SessionReport::new(session, app.settings.adequate_wording),
        )?,
    }

    if let Some(jig_number) = normalize_jig_number(&input) {
        app.remember(&jig_number);
    }
    if let Err(e) = app
        .store
        .save_session(&SessionSnapshot::from_summary(&session.summary))
    {
        log::warn!("Failed to save session snapshot: {e:#}");
    }

    let budget = app.wait_budget(1);
    if let Some(task) = tracker.notification() {
        let channel = task.channel();
        let spinner = create_spinner(format!("Sending {channel} alert..."));
        let state = task.wait(budget).clone();
        spinner.finish_and_clear();
        eprintln!("{}", render::notification_line(channel, &state));
        if state == NotificationState::Pending {
            log::warn!("{channel} alert did not finish in time");
        }
    }

    Ok(())
}
