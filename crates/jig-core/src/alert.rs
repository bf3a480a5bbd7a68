use crate::{JigSummary, LaunchAssessment};

/// Context line used when an operator sends an alert by hand
pub const MANUAL_ALERT_CONTEXT: &str = "Manual alert requested";

/// Describe why a jig is being reported
pub fn alert_context(assessment: &LaunchAssessment) -> String {
    if assessment.is_launched {
        return "Tester confirmed as launched".to_string();
    }
    if assessment.data_missing || assessment.has_no_parts() {
        return "Tester detected as NOT launched (No Parts Data Found)".to_string();
    }
    match assessment.reason.as_deref() {
        Some(reason) if assessment.reason_is_sale_order() => {
            format!("Tester detected as NOT launched (Shortage in SO: {reason})")
        }
        Some(reason) => format!("Tester detected as NOT launched ({reason})"),
        None => "Tester detected as NOT launched".to_string(),
    }
}

/// Build the alert text sent to the notification channels
pub fn compose_alert(summary: &JigSummary, context: &str, shortage_count: usize) -> String {
    let jig = if summary.tester_jig_number.is_empty() {
        "N/A"
    } else {
        summary.tester_jig_number.as_str()
    };
    format!("🚨 HAL Alert: {context}\nTester Jig ID: {jig}\nTotal Shortages: {shortage_count}")
}
