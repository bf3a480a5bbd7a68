//! Tracking backend API client
//!
//! Every method maps one endpoint under `{base}/api/`. Input is validated
//! before any request is made; backend error bodies of the form
//! `{ "message": ... }` are surfaced verbatim.

use atomicwrites::{AtomicFile, OverwriteBehavior};
use jig_core::{parts_from_json, JigSummary, PartRecord};
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::docs::{DocHit, MIN_DOC_QUERY_LEN};
use crate::{ApiError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Excel exports offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcelExport {
    AllParts,
    Recommended,
    Shortage,
}

impl ExcelExport {
    fn endpoint(self) -> &'static str {
        match self {
            ExcelExport::AllParts => "download_all_parts_excel",
            ExcelExport::Recommended => "download_recommended_excel",
            ExcelExport::Shortage => "download_shortage_excel",
        }
    }

    /// File name the backend suggests for this export
    pub fn default_file_name(self, jig_number: &str) -> String {
        match self {
            ExcelExport::AllParts => format!("HAL_All_Parts_{jig_number}.xlsx"),
            ExcelExport::Recommended => format!("HAL_Recommended_Purchase_{jig_number}.xlsx"),
            ExcelExport::Shortage => format!("HAL_Shortage_List_{jig_number}.xlsx"),
        }
    }
}

#[derive(Serialize)]
struct TelegramRequest<'a> {
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WhatsappRequest<'a> {
    tester_id: &'a str,
    official_incharge: &'a str,
    message: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("jig-tracker/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    fn unreachable(&self, source: reqwest::Error) -> ApiError {
        ApiError::Unreachable {
            base_url: self.base_url.clone(),
            source,
        }
    }

    fn get(&self, endpoint: &'static str, query: &[(&str, &str)]) -> Result<Response> {
        let url = self.endpoint_url(endpoint);
        log::debug!("GET {url} {query:?}");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| self.unreachable(e))?;
        check_response(resp)
    }

    fn post_json<T: Serialize>(&self, endpoint: &'static str, body: &T) -> Result<Response> {
        let url = self.endpoint_url(endpoint);
        log::debug!("POST {url}");

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.unreachable(e))?;
        check_response(resp)
    }

    /// Look up a tester jig's summary and sale orders
    pub fn jig_details(&self, jig_number: &str) -> Result<JigSummary> {
        let jig_number = require_jig(jig_number)?;
        let body = read_json(
            self.get("jig_details", &[("jig_number", jig_number)])?,
            "jig_details",
        )?;
        summary_from_details(body, jig_number)
    }

    /// Every part of a jig across all its sale orders.
    ///
    /// `Ok(None)` when the backend answered with JSON other than a list. A body
    /// that is not JSON at all is [`ApiError::InvalidResponse`].
    pub fn all_parts_for_jig(&self, jig_number: &str) -> Result<Option<Vec<PartRecord>>> {
        let jig_number = require_jig(jig_number)?;
        let body = read_json(
            self.get("all_parts_for_jig", &[("jig_number", jig_number)])?,
            "all_parts_for_jig",
        )?;
        Ok(parts_from_json(body))
    }

    /// Shortage list for one sale order of a jig
    pub fn shortage_list(
        &self,
        jig_number: &str,
        sale_order: &str,
    ) -> Result<Option<Vec<PartRecord>>> {
        let jig_number = require_jig(jig_number)?;
        let sale_order = sale_order.trim();
        if sale_order.is_empty() {
            return Err(ApiError::invalid_input("Please select a Sale Order."));
        }
        let body = read_json(
            self.get(
                "shortage_list",
                &[("jig_number", jig_number), ("sale_order", sale_order)],
            )?,
            "shortage_list",
        )?;
        Ok(parts_from_json(body))
    }

    /// Parts augmented with `p_factor` and `recommendedQuantity`
    pub fn recommend_purchase(&self, jig_number: &str) -> Result<Option<Vec<PartRecord>>> {
        let jig_number = require_jig(jig_number)?;
        let body = read_json(
            self.get("recommend_purchase", &[("jig_number", jig_number)])?,
            "recommend_purchase",
        )?;
        Ok(parts_from_json(body))
    }

    /// Send an alert through the backend's Telegram bot
    pub fn send_telegram_alert(&self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(ApiError::invalid_input("Message content is required."));
        }
        let body = read_json(
            self.post_json("send_telegram_alert", &TelegramRequest { message })?,
            "send_telegram_alert",
        )?;
        Ok(response_message(&body, "Telegram alert sent successfully!"))
    }

    /// Send a simulated WhatsApp alert to the official in charge.
    ///
    /// A missing, empty or `N/A` contact is rejected without a request.
    pub fn send_whatsapp_alert(
        &self,
        tester_id: &str,
        official_incharge: Option<&str>,
        message: &str,
    ) -> Result<String> {
        let official_incharge = official_incharge
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "N/A")
            .ok_or_else(|| {
                ApiError::invalid_input(
                    "Cannot send WhatsApp alert: Official Incharge number is missing/invalid.",
                )
            })?;

        let body = read_json(
            self.post_json(
                "send_whatsapp_alert",
                &WhatsappRequest {
                    tester_id,
                    official_incharge,
                    message,
                },
            )?,
            "send_whatsapp_alert",
        )?;
        Ok(response_message(&body, "WhatsApp alert simulation successful!"))
    }

    /// Full-text search over the documentation index
    pub fn search_docs(&self, query: &str) -> Result<Vec<DocHit>> {
        let query = query.trim();
        if query.chars().count() < MIN_DOC_QUERY_LEN {
            return Err(ApiError::invalid_input(format!(
                "Search query must be at least {MIN_DOC_QUERY_LEN} characters."
            )));
        }
        let body = read_json(self.get("search_docs", &[("query", query)])?, "search_docs")?;
        serde_json::from_value(body).map_err(|e| ApiError::InvalidResponse {
            endpoint: "search_docs",
            detail: e.to_string(),
        })
    }

    /// URL of an Excel export, for handing to a browser
    pub fn download_url(&self, export: ExcelExport, jig_number: &str) -> Result<String> {
        let jig_number = require_jig(jig_number)?;
        Ok(format!(
            "{}?jig_number={}",
            self.endpoint_url(export.endpoint()),
            urlencoding::encode(jig_number)
        ))
    }

    /// Download an Excel export to `dest`, returning the number of bytes written
    pub fn download_excel(
        &self,
        export: ExcelExport,
        jig_number: &str,
        dest: &Path,
    ) -> Result<u64> {
        let jig_number = require_jig(jig_number)?;
        let mut resp = self.get(export.endpoint(), &[("jig_number", jig_number)])?;

        AtomicFile::new(dest, OverwriteBehavior::AllowOverwrite)
            .write(|f| resp.copy_to(f).map_err(std::io::Error::other))
            .map_err(|err| ApiError::Write {
                path: dest.to_path_buf(),
                detail: err.to_string(),
            })
    }
}

fn require_jig(jig_number: &str) -> Result<&str> {
    let jig_number = jig_number.trim();
    if jig_number.is_empty() {
        return Err(ApiError::invalid_input(
            "Please enter a Tester Jig Number to search.",
        ));
    }
    Ok(jig_number)
}

/// Turn non-success responses into [`ApiError::Backend`] with the backend's message
fn check_response(resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let message = resp
        .text()
        .ok()
        .and_then(|body| {
            serde_json::from_str::<Value>(&body)
                .ok()?
                .get("message")?
                .as_str()
                .map(String::from)
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Error: {}", status.as_u16()));

    Err(ApiError::Backend {
        status: status.as_u16(),
        message,
    })
}

fn read_json(resp: Response, endpoint: &'static str) -> Result<Value> {
    resp.json::<Value>()
        .map_err(|e| ApiError::InvalidResponse {
            endpoint,
            detail: e.to_string(),
        })
}

fn response_message(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// Accepts both the flat summary and the `{ summary, saleOrders }` envelope
fn summary_from_details(body: Value, requested: &str) -> Result<JigSummary> {
    let invalid = |e: serde_json::Error| ApiError::InvalidResponse {
        endpoint: "jig_details",
        detail: e.to_string(),
    };

    if !body.is_object() {
        return Err(ApiError::InvalidResponse {
            endpoint: "jig_details",
            detail: "expected a JSON object".to_string(),
        });
    }

    let mut summary: JigSummary = match body.get("summary") {
        Some(inner) if inner.is_object() => {
            let mut summary: JigSummary =
                serde_json::from_value(inner.clone()).map_err(invalid)?;
            if summary.sale_orders.is_empty() {
                let outer: JigSummary = serde_json::from_value(body).map_err(invalid)?;
                summary.sale_orders = outer.sale_orders;
            }
            summary
        }
        _ => serde_json::from_value(body).map_err(invalid)?,
    };

    if summary.tester_jig_number.is_empty() {
        summary.tester_jig_number = requested.to_string();
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_from_flat_body() {
        let summary = summary_from_details(
            json!({
                "testerJigNumber": "TJ-1",
                "topAssyNo": "A-9",
                "saleOrders": ["SO2", "SO1"]
            }),
            "TJ-1",
        )
        .unwrap();
        assert_eq!(summary.sale_orders, vec!["SO2", "SO1"]);
        assert_eq!(summary.top_assy_no, "A-9");
    }

    #[test]
    fn test_summary_from_envelope() {
        let summary = summary_from_details(
            json!({
                "summary": {"testerJigNumber": "TJ-1", "topAssyNo": "A-9"},
                "saleOrders": ["SO1"]
            }),
            "TJ-1",
        )
        .unwrap();
        assert_eq!(summary.tester_jig_number, "TJ-1");
        assert_eq!(summary.sale_orders, vec!["SO1"]);
    }

    #[test]
    fn test_summary_falls_back_to_requested_number() {
        let summary = summary_from_details(json!({"saleOrders": []}), "TJ-5").unwrap();
        assert_eq!(summary.tester_jig_number, "TJ-5");
    }

    #[test]
    fn test_summary_rejects_non_object() {
        let err = summary_from_details(json!(["TJ-1"]), "TJ-1").unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidResponse {
                endpoint: "jig_details",
                ..
            }
        ));
    }

    #[test]
    fn test_require_jig() {
        assert_eq!(require_jig("  TJ-1 ").unwrap(), "TJ-1");
        assert!(matches!(require_jig("  "), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_download_url_is_encoded() {
        let client = ApiClient::new("http://example.test/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.download_url(ExcelExport::Shortage, "TJ 1/2").unwrap(),
            "http://example.test/api/download_shortage_excel?jig_number=TJ%201%2F2"
        );
    }
}
