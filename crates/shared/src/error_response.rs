//! # エラーレスポンス
//!
//! クライアントに返すエラーボディの構造体を提供する。
//!
//! ## 2 種類のボディ
//!
//! - [`BusinessErrorResponse`]: 業務エラー（`BE10xx`）。クライアントが `error_code` で分岐する契約
//! - [`ErrorResponse`]: RFC 9457 Problem Details。不正な JSON や内部エラーに使用
//!
//! どちらも純粋なデータ構造で、axum の `IntoResponse` 変換は各サービスが行う。

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://scribe.example.com/errors";

/// 業務エラーレスポンス
///
/// ```json
/// {"status_code": 400, "error_code": "BE1003", "error_message": "Invalid email"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessErrorResponse {
    pub status_code:   u16,
    pub error_code:    String,
    pub error_message: String,
}

impl BusinessErrorResponse {
    /// 400 の業務エラーを作成する
    pub fn bad_request(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            status_code:   400,
            error_code:    error_code.into(),
            error_message: error_message.into(),
        }
    }
}

/// エラーレスポンス（RFC 9457 Problem Details）
///
/// `type` フィールドは URI で問題の種類を識別する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"bad-request"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    /// 500 Internal Server Error
    ///
    /// detail は固定値。原因はログにのみ出力する。
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            500,
            "内部エラーが発生しました",
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_業務エラーは3フィールドのjsonになる() {
        let body = BusinessErrorResponse::bad_request("BE1003", "Invalid email");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status_code": 400,
                "error_code": "BE1003",
                "error_message": "Invalid email"
            })
        );
    }

    #[test]
    fn test_bad_requestが400と正しいerror_typeを返す() {
        let error = ErrorResponse::bad_request("JSON の形式が不正です");

        assert_eq!(
            error.error_type,
            "https://scribe.example.com/errors/bad-request"
        );
        assert_eq!(error.title, "Bad Request");
        assert_eq!(error.status, 400);
        assert_eq!(error.detail, "JSON の形式が不正です");
    }

    #[test]
    fn test_internal_errorは固定detailを返す() {
        let error = ErrorResponse::internal_error();

        assert_eq!(error.status, 500);
        assert_eq!(error.detail, "内部エラーが発生しました");
    }

    #[test]
    fn test_jsonシリアライズでtypeフィールド名になる() {
        let json = serde_json::to_value(ErrorResponse::bad_request("x")).unwrap();

        assert_eq!(json["type"], "https://scribe.example.com/errors/bad-request");
        assert!(json.get("error_type").is_none());
    }
}
