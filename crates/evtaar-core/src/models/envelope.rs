use serde::{Deserialize, Serialize};

/// Success envelope returned by every `/api/v1` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    // Go encodes nil slices as `null`, so data is never assumed present
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Failure envelope: `{ "error": { "code", "message", "details" } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorField,
}

/// A few notification handlers reply with `{"error": "..."}` instead of
/// the structured form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorField {
    Structured(ErrorBody),
    Plain(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorField {
    pub fn message(&self) -> &str {
        match self {
            ErrorField::Structured(body) => &body.message,
            ErrorField::Plain(message) => message,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ErrorField::Structured(body) => body.code.as_deref(),
            ErrorField::Plain(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// "Page 2 of 5 (93 items)"
    pub fn display(&self) -> String {
        format!(
            "Page {} of {} ({} items)",
            self.page,
            self.total_pages.max(1),
            self.total_items
        )
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> From<Envelope<Vec<T>>> for Page<T> {
    fn from(envelope: Envelope<Vec<T>>) -> Self {
        Self {
            items: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_data_becomes_empty_page() {
        let json = r#"{"success":true,"data":null,"pagination":{"page":1,"page_size":20,"total_pages":0,"total_items":0}}"#;
        let envelope: Envelope<Vec<String>> = serde_json::from_str(json).expect("parse envelope");
        let page = Page::from(envelope);
        assert!(page.is_empty());
        assert_eq!(page.pagination.map(|p| p.page_size), Some(20));
    }

    #[test]
    fn test_envelope_data_needs_no_default() {
        #[derive(Debug, Deserialize)]
        struct Opaque {
            id: String,
        }

        let empty: Envelope<Opaque> = serde_json::from_str(r#"{"success":true}"#).expect("parse");
        assert!(empty.data.is_none());

        let full: Envelope<Opaque> = serde_json::from_str(r#"{"data":{"id":"x"}}"#).expect("parse");
        assert_eq!(full.data.expect("data").id, "x");
    }

    #[test]
    fn test_error_envelope_both_shapes() {
        let structured: ErrorEnvelope = serde_json::from_str(
            r#"{"success":false,"error":{"code":"BAD_REQUEST","message":"email is required"}}"#,
        )
        .expect("parse structured error");
        assert_eq!(structured.error.message(), "email is required");
        assert_eq!(structured.error.code(), Some("BAD_REQUEST"));

        let plain: ErrorEnvelope =
            serde_json::from_str(r#"{"error":"Failed to get unread count"}"#).expect("parse plain error");
        assert_eq!(plain.error.message(), "Failed to get unread count");
        assert_eq!(plain.error.code(), None);
    }

    #[test]
    fn test_pagination_navigation() {
        let first = Pagination { page: 1, page_size: 10, total_pages: 3, total_items: 25 };
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = Pagination { page: 3, ..first };
        assert!(!last.has_next());
        assert!(last.has_prev());

        let empty = Pagination { page: 1, page_size: 10, total_pages: 0, total_items: 0 };
        assert!(!empty.has_next());
        assert_eq!(empty.display(), "Page 1 of 1 (0 items)");
    }
}
