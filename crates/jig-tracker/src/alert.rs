use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jig_api::{AlertChannel, Notifier};
use jig_core::{compose_alert, count_shortages, MANUAL_ALERT_CONTEXT};

use crate::app::{create_spinner, require_jig, App};

#[derive(Args, Debug)]
#[command(about = "Send an alert about a tester jig")]
pub struct AlertArgs {
    /// Tester jig number
    pub jig: String,

    /// Channel to send through (telegram, whatsapp)
    #[arg(long)]
    pub channel: Option<AlertChannel>,

    /// First line of the alert
    #[arg(long, default_value = MANUAL_ALERT_CONTEXT)]
    pub context: String,
}

pub fn execute(args: AlertArgs, app: &App) -> Result<()> {
    let jig_number = require_jig(&args.jig)?;
    let channel = args.channel.unwrap_or(app.settings.alert_channel);
    let client = app.client()?;

    let spinner = create_spinner(format!("Looking up {jig_number}..."));
    let lookup = client.jig_details(&jig_number).and_then(|summary| {
        let parts = client.all_parts_for_jig(&jig_number)?;
        Ok((summary, parts))
    });
    spinner.finish_and_clear();
    let (summary, parts) = lookup?;

    let shortage_count = parts.as_deref().map(count_shortages).unwrap_or(0);
    let message = compose_alert(&summary, &args.context, shortage_count);
    log::debug!("Alert text:\n{message}");

    let spinner = create_spinner(format!("Sending {channel} alert..."));
    let sent = client.notify(channel, &summary, &message);
    spinner.finish_and_clear();

    println!("{} {}", "Alert sent:".green(), sent?);
    Ok(())
}
