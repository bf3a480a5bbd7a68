pub mod alert;
pub mod availability;
pub mod history;
mod model;

pub use alert::{alert_context, compose_alert, MANUAL_ALERT_CONTEXT};
pub use availability::{
    action_required, assess_launch, compare_parts, count_shortages, group_by_sale_order,
    shortages_only, sort_parts, sorted_parts, AdequateWording, LaunchAssessment, LaunchMode,
    RowTone, NO_PARTS_DATA, OPERATOR_NOT_LAUNCHED, QUANTITY_INVALID,
};
pub use history::{SearchHistory, HISTORY_LIMIT};
pub use model::{
    normalize_jig_number, parts_from_json, AvailabilityStatus, JigSummary, PartRecord,
};

/// Error returned when a textual setting does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {setting} '{value}', expected one of: {expected}")]
pub struct ParseSettingError {
    pub setting: &'static str,
    pub value: String,
    pub expected: &'static str,
}
