pub mod client;
pub mod docs;
mod error;
pub mod notify;

pub use client::{ApiClient, ExcelExport, DEFAULT_TIMEOUT_SECS};
pub use docs::{doc_page_link, jig_document_link, DocHit, MIN_DOC_QUERY_LEN};
pub use error::{ApiError, Result};
pub use notify::{AlertChannel, Notifier};

/// Default backend when neither `JIG_API_URL` nor a config file names one
pub const DEFAULT_API_URL: &str = "http://localhost:5001";

/// Environment variable naming the backend base URL
pub const API_URL_ENV: &str = "JIG_API_URL";
