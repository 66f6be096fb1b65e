//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: UserId / Username / Email をラップし、型安全性を確保
//! - **不変性**: エンティティフィールドは不変、変更はメソッド経由で新しい値を返す
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use scribe_domain::user::{Email, User, UserId, Username};
//!
//! let user = User::from_db(
//!     UserId::from_i64(1),
//!     Username::new("alice"),
//!     Email::new("alice@example.com")?,
//! );
//!
//! let updated = user.with_email(Email::new("alice@example.org")?);
//! assert_eq!(updated.email().as_str(), "alice@example.org");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::{BusinessErrorCode, DomainError};

define_serial_id! {
    /// ユーザー ID（一意識別子）
    ///
    /// `users.user_id`（BIGSERIAL）に対応する。
    pub struct UserId;
}

/// ユーザー名（値オブジェクト）
///
/// ユーザーを一意に識別するログイン名。URL のパスパラメータにも使われる。
///
/// 受け取った文字列をそのまま保持する（空文字列・空白のみも有効な値）。
/// 未指定かどうかの判定は API 層の責務。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// メールアドレス（値オブジェクト）
///
/// # バリデーション
///
/// - `@` を含む
///
/// 空文字列は「指定あり・形式不正」として扱う（未指定の判定は API 層の責務）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # エラー
    ///
    /// `@` を含まない場合は `BE1003`（メールアドレス不正）を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if !value.contains('@') {
            return Err(DomainError::Validation(BusinessErrorCode::InvalidEmail));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 新規ユーザー
///
/// 永続化前のユーザー。ID はデータベースが採番するため持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email:    Email,
}

/// ユーザーエンティティ
///
/// # 不変条件
///
/// - `username` はシステム全体で一意
/// - `email` はシステム全体で一意、かつ `@` を含む
/// - 著者として記事に紐づいている間は削除できない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:       UserId,
    username: Username,
    email:    Email,
}

impl User {
    /// 既存のデータからユーザーを復元する（データベースから取得時）
    pub fn from_db(id: UserId, username: Username, email: Email) -> Self {
        Self {
            id,
            username,
            email,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// メールアドレスを変更した新しいインスタンスを返す
    ///
    /// ユーザー名は変更できない（URL の識別子として使われるため）。
    pub fn with_email(self, email: Email) -> Self {
        Self { email, ..self }
    }
}
