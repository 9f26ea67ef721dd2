//! Uniform response envelope for the API surfaces.

use serde::Serialize;

use crate::error::TenorError;
use crate::repository::{PageMeta, PaginatedResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            meta: None,
            data: Some(data),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(message: impl Into<String>, page: PaginatedResult<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            meta: Some(page.meta),
            data: Some(page.items),
        }
    }
}

impl ApiResponse<()> {
    /// Error envelope together with the HTTP status to send it with.
    pub fn from_error(err: &TenorError) -> (u16, Self) {
        (
            err.status_code(),
            Self {
                success: false,
                message: err.to_string(),
                meta: None,
                data: None,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Pagination;

    #[test]
    fn ok_envelope_omits_meta() {
        let body = serde_json::to_value(ApiResponse::ok("done", 7)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "done", "data": 7})
        );
    }

    #[test]
    fn paginated_envelope_carries_meta() {
        let page = PaginatedResult {
            items: vec!["a", "b"],
            meta: PageMeta::new(&Pagination::default(), 2),
        };
        let body = serde_json::to_value(ApiResponse::paginated("list", page)).unwrap();
        assert_eq!(body["meta"]["total_count"], 2);
        assert_eq!(body["meta"]["total_pages"], 1);
        assert_eq!(body["data"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn error_envelope_uses_status_code() {
        let (status, body) = ApiResponse::from_error(&TenorError::not_found("customer", "42"));
        assert_eq!(status, 404);
        assert!(!body.success);
        assert!(body.data.is_none());
    }
}
