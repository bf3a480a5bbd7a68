use jig_core::{JigSummary, ParseSettingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ApiClient, Result};

/// Outbound channel for shortage alerts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertChannel {
    #[default]
    Telegram,
    /// Simulated on the backend
    Whatsapp,
}

impl fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertChannel::Telegram => write!(f, "telegram"),
            AlertChannel::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

impl FromStr for AlertChannel {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telegram" => Ok(AlertChannel::Telegram),
            "whatsapp" => Ok(AlertChannel::Whatsapp),
            _ => Err(ParseSettingError {
                setting: "alert channel",
                value: s.to_string(),
                expected: "telegram, whatsapp",
            }),
        }
    }
}

/// Sends an alert about a jig; returns the confirmation text on success
pub trait Notifier: Send + Sync {
    fn notify(&self, channel: AlertChannel, summary: &JigSummary, message: &str) -> Result<String>;
}

impl Notifier for ApiClient {
    fn notify(&self, channel: AlertChannel, summary: &JigSummary, message: &str) -> Result<String> {
        log::debug!(
            "Sending {channel} alert for jig {}",
            summary.tester_jig_number
        );
        match channel {
            AlertChannel::Telegram => self.send_telegram_alert(message),
            AlertChannel::Whatsapp => {
                let tester_id = summary
                    .tester_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .unwrap_or(&summary.tester_jig_number);
                self.send_whatsapp_alert(tester_id, summary.official_incharge.as_deref(), message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("WhatsApp".parse::<AlertChannel>(), Ok(AlertChannel::Whatsapp));
        assert!("sms".parse::<AlertChannel>().is_err());
        assert_eq!(AlertChannel::default().to_string(), "telegram");
    }
}
