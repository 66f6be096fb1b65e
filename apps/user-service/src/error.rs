//! # User Service エラー定義
//!
//! User Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス | ボディ |
//! |-----------|-----------|--------|
//! | `NotFound` | 404 | なし |
//! | `BusinessValidation` | 400 | `{status_code, error_code, error_message}` |
//! | `BadRequest` | 400 | RFC 9457 |
//! | `Database` | 500 | RFC 9457（詳細はログのみ） |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scribe_domain::{BusinessErrorCode, DomainError};
use scribe_infra::InfraError;
use scribe_shared::{BusinessErrorResponse, ErrorResponse};
use thiserror::Error;

/// User Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// ユーザーが見つからない
    #[error("ユーザーが見つかりません")]
    NotFound,

    /// 業務エラー（BE10xx）
    #[error("業務エラー: {0}")]
    BusinessValidation(BusinessErrorCode),

    /// リクエストボディが解釈できない
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),
}

impl From<BusinessErrorCode> for CoreError {
    fn from(code: BusinessErrorCode) -> Self {
        Self::BusinessValidation(code)
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        err.code().into()
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        match self {
            CoreError::NotFound => StatusCode::NOT_FOUND.into_response(),
            CoreError::BusinessValidation(code) => (
                StatusCode::BAD_REQUEST,
                Json(BusinessErrorResponse::bad_request(
                    code.code(),
                    code.message(),
                )),
            )
                .into_response(),
            CoreError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(detail)),
            )
                .into_response(),
            CoreError::Database(e) => {
                tracing::error!(
                    error = %e,
                    span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error()),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;

    use super::*;

    async fn into_parts(err: CoreError) -> (StatusCode, Vec<u8>) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_not_foundは空ボディの404() {
        let (status, body) = into_parts(CoreError::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_業務エラーはコードとメッセージを返す() {
        let (status, body) =
            into_parts(CoreError::BusinessValidation(BusinessErrorCode::DuplicateEmail)).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({
                "status_code": 400,
                "error_code": "BE1006",
                "error_message": "Duplicate email"
            })
        );
    }

    #[tokio::test]
    async fn test_データベースエラーは内部情報を含まない500() {
        let (status, body) = into_parts(CoreError::Database(InfraError::unexpected(
            "connection refused: 10.0.0.5",
        )))
        .await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], 500);
        assert!(!json["detail"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[test]
    fn test_domain_errorは業務エラーに変換される() {
        let err: CoreError = DomainError::Validation(BusinessErrorCode::InvalidEmail).into();

        assert!(matches!(
            err,
            CoreError::BusinessValidation(BusinessErrorCode::InvalidEmail)
        ));
    }
}
