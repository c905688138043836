/// JSON response envelope shared by every REST endpoint
use serde::Serialize;
use serde_json::Value;

/// `{ success, message, data?, errors?, total?, pagination? }`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Cursor pagination details; `nextCursor` and `nextUrl` are null on the last page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub next_cursor: Option<i64>,
    pub next_url: Option<String>,
    pub limit: usize,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(true, message.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(false, message.into())
    }

    fn new(success: bool, message: String) -> Self {
        Self {
            success,
            message,
            data: None,
            errors: None,
            total: None,
            pagination: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    #[must_use]
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}
