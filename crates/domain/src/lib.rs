//! # Scribe ドメイン層
//!
//! ユーザーと記事（著者関係）のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: `Username` / `Email` は生成時に検証し、不正な値を作らせない
//! - **エンティティ**: `User` / `Article` はデータベースが採番した整数 ID を持つ
//! - **業務エラーコード**: クライアントに返す `BE10xx` コードはドメインで定義する
//!
//! ## 依存関係の方向
//!
//! ```text
//! user-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use scribe_domain::{
//!     BusinessErrorCode,
//!     DomainError,
//!     user::Email,
//! };
//!
//! let err = Email::new("no-at-mark").unwrap_err();
//! assert!(matches!(err, DomainError::Validation(BusinessErrorCode::InvalidEmail)));
//! ```

#[macro_use]
mod macros;

pub mod article;
pub mod error;
pub mod user;

pub use error::{BusinessErrorCode, DomainError};
