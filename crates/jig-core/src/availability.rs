//! Parts availability rules - severity ordering, action text and launch status
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{AvailabilityStatus, ParseSettingError, PartRecord};

/// Launch reason when the jig has no part records
pub const NO_PARTS_DATA: &str = "No Parts Data Found";

/// Launch reason when an operator marks the jig as not launched
pub const OPERATOR_NOT_LAUNCHED: &str = "Marked not launched by operator";

/// Action text when either quantity is missing or not numeric
pub const QUANTITY_INVALID: &str = "Quantity data unavailable/invalid.";

/// Wording used for the action text of adequately stocked parts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdequateWording {
    #[default]
    Nill,
    Adequate,
}

impl AdequateWording {
    pub fn text(self) -> &'static str {
        match self {
            AdequateWording::Nill => "NILL",
            AdequateWording::Adequate => "Quantity is adequate.",
        }
    }
}

impl FromStr for AdequateWording {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nill" => Ok(AdequateWording::Nill),
            "adequate" => Ok(AdequateWording::Adequate),
            _ => Err(ParseSettingError {
                setting: "adequate wording",
                value: s.to_string(),
                expected: "nill, adequate",
            }),
        }
    }
}

/// How the launch status of a jig is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Derived from the availability of every part
    #[default]
    Auto,
    /// Set by the operator
    Manual,
}

impl FromStr for LaunchMode {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(LaunchMode::Auto),
            "manual" => Ok(LaunchMode::Manual),
            _ => Err(ParseSettingError {
                setting: "launch mode",
                value: s.to_string(),
                expected: "auto, manual",
            }),
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Auto => write!(f, "auto"),
            LaunchMode::Manual => write!(f, "manual"),
        }
    }
}

/// Row highlighting for a part, by status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    Critical,
    Shortage,
    Surplus,
    Plain,
}

impl RowTone {
    pub fn for_status(status: &AvailabilityStatus) -> Self {
        match status {
            AvailabilityStatus::CriticalShortage => RowTone::Critical,
            AvailabilityStatus::Shortage => RowTone::Shortage,
            AvailabilityStatus::Surplus => RowTone::Surplus,
            _ => RowTone::Plain,
        }
    }
}

/// Display ordering: sale order ascending, then status priority ascending.
#[inline]
pub fn compare_parts(a: &PartRecord, b: &PartRecord) -> Ordering {
    a.sale_order.cmp(&b.sale_order).then_with(|| {
        a.availability_status
            .priority()
            .cmp(&b.availability_status.priority())
    })
}

/// Sort parts for display. Stable: ties keep their input order.
pub fn sort_parts(parts: &mut [PartRecord]) {
    parts.sort_by(compare_parts);
}

/// Sorted copy of `parts`
pub fn sorted_parts(parts: &[PartRecord]) -> Vec<PartRecord> {
    let mut sorted = parts.to_vec();
    sort_parts(&mut sorted);
    sorted
}

/// Human-readable action for one part.
///
/// Missing quantities take precedence over the status; a recognised quantity
/// pair with a status that has no action yields `"N/A"`.
pub fn action_required(part: &PartRecord, wording: AdequateWording) -> String {
    let (Some(required), Some(stock)) = (part.required_quantity, part.current_stock) else {
        return QUANTITY_INVALID.to_string();
    };

    match part.availability_status {
        AvailabilityStatus::Shortage => {
            format!("Missing {} units.", required.saturating_sub(stock))
        }
        AvailabilityStatus::CriticalShortage => "Immediate action: ZERO stock!".to_string(),
        AvailabilityStatus::Surplus => {
            format!("Surplus of {} units.", stock.saturating_sub(required))
        }
        AvailabilityStatus::Adequate => wording.text().to_string(),
        _ => "N/A".to_string(),
    }
}

/// Aggregate launch readiness of a jig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchAssessment {
    pub is_launched: bool,
    /// Sale order of the first shortage, or a sentinel such as [`NO_PARTS_DATA`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The parts payload was absent or not a list
    pub data_missing: bool,
}

impl LaunchAssessment {
    pub fn launched() -> Self {
        Self {
            is_launched: true,
            reason: None,
            data_missing: false,
        }
    }

    pub fn not_launched(reason: impl Into<String>) -> Self {
        Self {
            is_launched: false,
            reason: Some(reason.into()),
            data_missing: false,
        }
    }

    fn missing_data() -> Self {
        Self {
            data_missing: true,
            ..Self::not_launched(NO_PARTS_DATA)
        }
    }

    /// Status set by an operator instead of derived from parts
    pub fn manual(is_launched: bool) -> Self {
        if is_launched {
            Self::launched()
        } else {
            Self::not_launched(OPERATOR_NOT_LAUNCHED)
        }
    }

    /// True when the jig has no parts to assess (missing or empty list)
    pub fn has_no_parts(&self) -> bool {
        !self.is_launched && self.reason.as_deref() == Some(NO_PARTS_DATA)
    }

    /// True when the reason names the sale order of a shortage
    pub fn reason_is_sale_order(&self) -> bool {
        !self.is_launched
            && !self.data_missing
            && self
                .reason
                .as_deref()
                .is_some_and(|r| r != NO_PARTS_DATA && r != OPERATOR_NOT_LAUNCHED)
    }
}

/// Derive launch readiness from every part of a jig.
///
/// `None` means the backend returned no usable parts list. The first part in
/// input order with a shortage status decides the reason.
pub fn assess_launch(parts: Option<&[PartRecord]>) -> LaunchAssessment {
    let Some(parts) = parts else {
        log::debug!("Launch status: not launched (parts data missing)");
        return LaunchAssessment::missing_data();
    };

    if parts.is_empty() {
        log::debug!("Launch status: not launched (no parts)");
        return LaunchAssessment::not_launched(NO_PARTS_DATA);
    }

    match parts.iter().find(|p| p.availability_status.is_shortage()) {
        Some(part) => {
            log::debug!(
                "Launch status: not launched (SO {}, part {}, status {})",
                part.sale_order,
                part.part_number,
                part.availability_status
            );
            LaunchAssessment::not_launched(part.sale_order.clone())
        }
        None => LaunchAssessment::launched(),
    }
}

/// Number of parts in Shortage or Critical Shortage
pub fn count_shortages(parts: &[PartRecord]) -> usize {
    parts
        .iter()
        .filter(|p| p.availability_status.is_shortage())
        .count()
}

/// Parts in Shortage or Critical Shortage, in input order
pub fn shortages_only(parts: &[PartRecord]) -> Vec<PartRecord> {
    parts
        .iter()
        .filter(|p| p.availability_status.is_shortage())
        .cloned()
        .collect()
}

/// Group parts by sale order, keeping input order within each group
pub fn group_by_sale_order(parts: &[PartRecord]) -> BTreeMap<String, Vec<PartRecord>> {
    let mut groups: BTreeMap<String, Vec<PartRecord>> = BTreeMap::new();
    for part in parts {
        groups
            .entry(part.sale_order.clone())
            .or_default()
            .push(part.clone());
    }
    groups
}
