//! # ユースケース層
//!
//! ハンドラから呼び出されるアプリケーションロジックを定義する。
//! リポジトリはトレイトオブジェクトとして受け取り、テストではモックに差し替える。

pub mod user;

pub use user::UserUseCaseImpl;
