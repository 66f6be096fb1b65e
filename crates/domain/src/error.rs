//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型と、クライアントに返す業務エラーコード。
//!
//! ## 業務エラーコード
//!
//! | コード | 意味 | HTTP ステータス |
//! |--------|------|----------------|
//! | `BE1001` | ユーザー名が未指定 | 400 |
//! | `BE1002` | メールアドレスが未指定 | 400 |
//! | `BE1003` | メールアドレスに `@` が含まれない | 400 |
//! | `BE1004` | ユーザー名またはメールアドレスが登録済み（作成時） | 400 |
//! | `BE1005` | 著者として記事に紐づいている（削除時） | 400 |
//! | `BE1006` | メールアドレスが登録済み（更新時） | 400 |
//!
//! `error_message` はクライアントとの契約のため英語の固定文言とする。

use strum::{EnumString, IntoStaticStr};
use thiserror::Error;

/// 業務エラーコード
///
/// 宣言順が検証の優先順位になる（`Ord` を derive）。
/// 複数の入力エラーが同時に発生した場合、最も小さいコードを返す。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
pub enum BusinessErrorCode {
    /// ユーザー名が未指定
    #[strum(serialize = "BE1001")]
    UsernameRequired,
    /// メールアドレスが未指定
    #[strum(serialize = "BE1002")]
    EmailRequired,
    /// メールアドレスの形式が不正
    #[strum(serialize = "BE1003")]
    InvalidEmail,
    /// ユーザーが重複している
    #[strum(serialize = "BE1004")]
    DuplicateUser,
    /// 著者として記事に紐づいているため削除できない
    #[strum(serialize = "BE1005")]
    UserHasArticles,
    /// メールアドレスが重複している
    #[strum(serialize = "BE1006")]
    DuplicateEmail,
}

impl BusinessErrorCode {
    /// コード文字列（例: `"BE1003"`）を取得する
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// クライアントに返すエラーメッセージ
    pub fn message(self) -> &'static str {
        match self {
            Self::UsernameRequired => "username is required",
            Self::EmailRequired => "email is required",
            Self::InvalidEmail => "Invalid email",
            Self::DuplicateUser => "Duplicate user",
            Self::UserHasArticles => "User has authored articles",
            Self::DuplicateEmail => "Duplicate email",
        }
    }
}

/// ドメイン層で発生するエラー
///
/// 値オブジェクトの生成時やエンティティの状態遷移時に発生する。
/// API 層でこのエラーを受け取り、業務エラーレスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(BusinessErrorCode),
}

impl DomainError {
    /// 業務エラーコードを取得する
    pub fn code(&self) -> BusinessErrorCode {
        match self {
            Self::Validation(code) => *code,
        }
    }
}
