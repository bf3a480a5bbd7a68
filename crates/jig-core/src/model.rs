use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Stock sufficiency classification reported by the backend.
///
/// The backend is authoritative: the status is never recomputed from
/// quantities. Unrecognised strings are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AvailabilityStatus {
    CriticalShortage,
    Shortage,
    Pending,
    Adequate,
    Surplus,
    NotApplicable,
    #[default]
    Unknown,
    Other(String),
}

impl AvailabilityStatus {
    /// Classify a raw status string, ignoring surrounding whitespace
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Critical Shortage" => AvailabilityStatus::CriticalShortage,
            "Shortage" => AvailabilityStatus::Shortage,
            "Pending" => AvailabilityStatus::Pending,
            "Adequate" => AvailabilityStatus::Adequate,
            "Surplus" => AvailabilityStatus::Surplus,
            "N/A" => AvailabilityStatus::NotApplicable,
            "Unknown" => AvailabilityStatus::Unknown,
            other => AvailabilityStatus::Other(other.to_string()),
        }
    }

    /// Display priority (lower is shown first)
    #[inline]
    pub fn priority(&self) -> u8 {
        match self {
            AvailabilityStatus::CriticalShortage => 1,
            AvailabilityStatus::Shortage => 2,
            AvailabilityStatus::Pending => 3,
            AvailabilityStatus::Adequate => 4,
            AvailabilityStatus::Surplus => 5,
            AvailabilityStatus::NotApplicable => 6,
            AvailabilityStatus::Unknown => 7,
            AvailabilityStatus::Other(_) => 8,
        }
    }

    /// True for the two statuses that block a jig from launching
    #[inline]
    pub fn is_shortage(&self) -> bool {
        matches!(
            self,
            AvailabilityStatus::Shortage | AvailabilityStatus::CriticalShortage
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            AvailabilityStatus::CriticalShortage => "Critical Shortage",
            AvailabilityStatus::Shortage => "Shortage",
            AvailabilityStatus::Pending => "Pending",
            AvailabilityStatus::Adequate => "Adequate",
            AvailabilityStatus::Surplus => "Surplus",
            AvailabilityStatus::NotApplicable => "N/A",
            AvailabilityStatus::Unknown => "Unknown",
            AvailabilityStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for AvailabilityStatus {
    fn from(raw: String) -> Self {
        AvailabilityStatus::parse(&raw)
    }
}

impl From<&str> for AvailabilityStatus {
    fn from(raw: &str) -> Self {
        AvailabilityStatus::parse(raw)
    }
}

impl From<AvailabilityStatus> for String {
    fn from(status: AvailabilityStatus) -> Self {
        match status {
            AvailabilityStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One required part of a tester jig, as returned by the backend.
///
/// Backend revisions disagree on key casing, so the snake_case spellings are
/// accepted as aliases. Quantities that are missing or not finite integral
/// numbers deserialize to `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    #[serde(default, alias = "part_number", deserialize_with = "text")]
    pub part_number: String,

    #[serde(default, alias = "unit_name", deserialize_with = "text")]
    pub unit_name: String,

    #[serde(default, alias = "sale_order", deserialize_with = "text")]
    pub sale_order: String,

    #[serde(
        default,
        alias = "required_quantity",
        deserialize_with = "quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub required_quantity: Option<i64>,

    #[serde(
        default,
        alias = "current_stock",
        deserialize_with = "quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_stock: Option<i64>,

    #[serde(default, alias = "availability_status", deserialize_with = "status")]
    pub availability_status: AvailabilityStatus,

    // Purchase recommendation fields
    #[serde(
        default,
        rename = "p_factor",
        alias = "pFactor",
        deserialize_with = "number",
        skip_serializing_if = "Option::is_none"
    )]
    pub p_factor: Option<f64>,
    #[serde(
        default,
        alias = "recommended_quantity",
        deserialize_with = "quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommended_quantity: Option<i64>,
}

/// Header information for a tester jig
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JigSummary {
    #[serde(default, alias = "tester_jig_number", deserialize_with = "text")]
    pub tester_jig_number: String,

    #[serde(default, alias = "top_assy_no", deserialize_with = "text")]
    pub top_assy_no: String,

    /// Sale orders in backend order
    #[serde(default, alias = "sale_orders", deserialize_with = "text_list")]
    pub sale_orders: Vec<String>,

    #[serde(
        default,
        alias = "tester_id",
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub tester_id: Option<String>,

    #[serde(
        default,
        alias = "official_incharge",
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub official_incharge: Option<String>,

    /// Free-form status string some backend revisions attach
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
}

/// Trim and upper-case a jig number typed by the operator.
///
/// Returns `None` for blank input.
pub fn normalize_jig_number(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Interpret a parts payload.
///
/// Returns `None` when the payload is not an array at all. Array elements that
/// are not part objects are skipped.
pub fn parts_from_json(value: Value) -> Option<Vec<PartRecord>> {
    let Value::Array(items) = value else {
        return None;
    };

    let parts = items
        .into_iter()
        .enumerate()
        .filter_map(
            |(idx, item)| match serde_json::from_value::<PartRecord>(item) {
                Ok(part) => Some(part),
                Err(e) => {
                    log::warn!("Skipping malformed part record at index {idx}: {e}");
                    None
                }
            },
        )
        .collect();

    Some(parts)
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn value_to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn value_to_quantity(value: &Value) -> Option<i64> {
    if let Value::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
    }
    if let Value::String(s) = value {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Some(i);
        }
    }
    // Integral floats like 4.0 (pandas emits these for int columns with gaps)
    value_to_number(value)
        .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
        .map(|n| n as i64)
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .and_then(value_to_text)
        .unwrap_or_default())
}

fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(value_to_text))
}

fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_text).collect(),
        Some(single) => value_to_text(single).into_iter().collect(),
        None => Vec::new(),
    })
}

fn status<'de, D: Deserializer<'de>>(d: D) -> Result<AvailabilityStatus, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .and_then(value_to_text)
        .map(|raw| AvailabilityStatus::parse(&raw))
        .unwrap_or_default())
}

fn quantity<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_to_quantity))
}

fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_to_number))
}
