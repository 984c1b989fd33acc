//! JSON bodies exchanged with the upload endpoint.
//!
//! Field names follow the existing web client (`oldId`, `Code`, `Url`,
//! `Message`), so they are renamed explicitly rather than by a blanket
//! `rename_all`.

use serde::{Deserialize, Serialize};

use crate::constants::{CODE_FAILURE, CODE_SUCCESS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRequest {
    pub content: String,
    /// ID of the file this upload replaces. Deleted once the new file is written.
    #[serde(rename = "oldId", default, skip_serializing_if = "Option::is_none")]
    pub old_id: Option<String>,
}

impl UploadRequest {
    pub fn new(content: impl Into<String>, old_id: Option<String>) -> Self {
        Self {
            content: content.into(),
            old_id,
        }
    }

    /// The replaced ID, ignoring an empty string the way a falsy value is ignored.
    pub fn replaced_id(&self) -> Option<&str> {
        self.old_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    #[serde(rename = "Code")]
    pub code: u8,
    #[serde(rename = "Url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "Message")]
    pub message: String,
}

impl UploadResponse {
    pub fn success(url: String, message: impl Into<String>) -> Self {
        Self {
            code: CODE_SUCCESS,
            url: Some(url),
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            code: CODE_FAILURE,
            url: None,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let req: UploadRequest =
            serde_json::from_str(r#"{"content":"vmess://x","oldId":"abc"}"#).unwrap();
        assert_eq!(req.content, "vmess://x");
        assert_eq!(req.replaced_id(), Some("abc"));

        let bare: UploadRequest = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
        assert_eq!(bare.old_id, None);
        assert_eq!(
            serde_json::to_string(&bare).unwrap(),
            r#"{"content":"x"}"#
        );
    }

    #[test]
    fn test_empty_old_id_is_ignored() {
        let req = UploadRequest::new("x", Some(String::new()));
        assert_eq!(req.replaced_id(), None);
    }

    #[test]
    fn test_response_wire_names() {
        let ok = UploadResponse::success("http://h/api/sub/a".into(), "uploaded");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["Code"], 1);
        assert_eq!(json["Url"], "http://h/api/sub/a");
        assert_eq!(json["Message"], "uploaded");

        let failed = serde_json::to_value(UploadResponse::failure("nope")).unwrap();
        assert_eq!(failed["Code"], 0);
        assert!(failed.get("Url").is_none());
    }
}
