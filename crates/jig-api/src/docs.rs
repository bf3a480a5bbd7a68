use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Shortest query the documentation search accepts
pub const MIN_DOC_QUERY_LEN: usize = 3;

/// One page matching a documentation search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocHit {
    pub filename: String,
    /// 1-based page number (the index stores it as text)
    #[serde(deserialize_with = "page_number")]
    pub page_num: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl DocHit {
    /// `"{filename} (Page {page_num})"`
    pub fn title(&self) -> String {
        format!("{} (Page {})", self.filename, self.page_num)
    }

    /// Snippet text, or `...` when the index returned none
    pub fn snippet_or_ellipsis(&self) -> &str {
        self.snippet
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("...")
    }
}

fn page_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Viewer link for a search hit
pub fn doc_page_link(base_url: &str, hit: &DocHit) -> String {
    format!(
        "{}/static/docs/{}#page={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&hit.filename),
        hit.page_num
    )
}

/// Link to a jig's own document of the given type (e.g. `manual`, `schematic`)
pub fn jig_document_link(base_url: &str, jig_number: &str, doc_type: &str) -> String {
    format!(
        "{}/static/docs/{}.pdf",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&format!("{jig_number}_{doc_type}"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_accepts_numeric_page() {
        let hit: DocHit = serde_json::from_value(json!({
            "filename": "TJ-1_manual.pdf",
            "page_num": 4,
            "snippet": null
        }))
        .unwrap();
        assert_eq!(hit.page_num, "4");
        assert_eq!(hit.title(), "TJ-1_manual.pdf (Page 4)");
        assert_eq!(hit.snippet_or_ellipsis(), "...");
    }

    #[test]
    fn test_links() {
        let hit = DocHit {
            filename: "wiring guide.pdf".to_string(),
            page_num: "12".to_string(),
            snippet: Some("relay".to_string()),
        };
        assert_eq!(
            doc_page_link("http://host:5001/", &hit),
            "http://host:5001/static/docs/wiring%20guide.pdf#page=12"
        );
        assert_eq!(
            jig_document_link("http://host:5001", "TJ-1", "manual"),
            "http://host:5001/static/docs/TJ-1_manual.pdf"
        );
    }
}
