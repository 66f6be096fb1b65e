//! # リポジトリ実装
//!
//! ユースケース層が利用するリポジトリトレイトと、その PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod article_repository;
pub mod user_repository;

pub use article_repository::{ArticleRepository, PostgresArticleRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
