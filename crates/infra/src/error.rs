//! # インフラ層エラー定義
//!
//! PostgreSQL とのやり取りで発生するエラー。
//!
//! [`InfraError`] はエラー種別 [`InfraErrorKind`] と、生成時点の
//! [`SpanTrace`] を組で持つ。`?` で `sqlx::Error` から変換した時点の
//! スパン（どのリポジトリ操作中か）がログに残る。
//!
//! 制約違反（一意・外部キー・CHECK）は制約名付きで分類する。
//! 事前チェックをすり抜けた同時リクエストの検出に使う。

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// ```
/// use scribe_infra::InfraError;
///
/// let err = InfraError::constraint_violation("users_email_key");
/// assert_eq!(err.violated_constraint(), Some("users_email_key"));
/// ```
#[derive(Debug, Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// SQL の実行失敗・接続失敗
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// 制約違反
    #[error("制約違反: {constraint}")]
    ConstraintViolation {
        /// PostgreSQL の制約名（例: `users_email_key`）
        constraint: String,
    },

    /// 行をドメイン型に復元できないなど、起こり得ないはずの状態
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn constraint_violation(constraint: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::ConstraintViolation {
            constraint: constraint.into(),
        })
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Unexpected(msg.into()))
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// エラー生成時のスパン経路
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 制約違反であれば制約名を返す
    pub fn violated_constraint(&self) -> Option<&str> {
        match &self.kind {
            InfraErrorKind::ConstraintViolation { constraint } => Some(constraint),
            _ => None,
        }
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        let constraint = source
            .as_database_error()
            .filter(|e| {
                e.is_unique_violation() || e.is_foreign_key_violation() || e.is_check_violation()
            })
            .and_then(|e| e.constraint())
            .map(str::to_owned);

        match constraint {
            Some(constraint) => {
                tracing::debug!(error = %source, %constraint, "制約違反を検出");
                Self::constraint_violation(constraint)
            }
            None => Self::new(InfraErrorKind::Database(source)),
        }
    }
}
