//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **書き込みは TxContext 必須**: insert / update / delete は `&mut TxContext` を取る
//! - **一意性は DB でも保証**: `users_username_key` / `users_email_key` 制約違反は
//!   [`InfraError::violated_constraint`] で制約名として取り出せる
//! - **ドメイン型への復元**: 行から値オブジェクトを再構築し、不正値は Unexpected とする

use async_trait::async_trait;
use scribe_domain::user::{Email, NewUser, User, UserId, Username};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// ユーザーリポジトリトレイト
///
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザー名でユーザーを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, InfraError>;

    /// メールアドレスでユーザーを検索
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;

    /// ユーザー名またはメールアドレスのいずれかが一致するユーザーを検索
    ///
    /// 作成時の重複チェックに使用する。
    async fn find_by_username_or_email(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<Option<User>, InfraError>;

    /// ユーザーを挿入し、採番された ID を含むユーザーを返す
    async fn insert(&self, tx: &mut TxContext, user: &NewUser) -> Result<User, InfraError>;

    /// メールアドレスを更新する
    async fn update_email(&self, tx: &mut TxContext, user: &User) -> Result<(), InfraError>;

    /// ユーザーを削除する
    async fn delete(&self, tx: &mut TxContext, id: UserId) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// users テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id:  i64,
    username: String,
    email:    String,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::from_db(
            UserId::from_i64(row.user_id),
            Username::new(row.username),
            Email::new(row.email).map_err(|e| InfraError::unexpected(e.to_string()))?,
        ))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_username_or_email(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email
            FROM users
            WHERE username = $1 OR email = $2
            ORDER BY user_id
            LIMIT 1
            "#,
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, tx: &mut TxContext, user: &NewUser) -> Result<User, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING user_id, username, email
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .fetch_one(tx.conn()?)
        .await?;

        User::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(user_id = %user.id()))]
    async fn update_email(&self, tx: &mut TxContext, user: &User) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2
            WHERE user_id = $1
            "#,
        )
        .bind(user.id().as_i64())
        .bind(user.email().as_str())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(user_id = %id))]
    async fn delete(&self, tx: &mut TxContext, id: UserId) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id.as_i64())
            .execute(tx.conn()?)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_user_repositoryはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresUserRepository>();
    }

    #[test]
    fn test_不正なメールアドレスの行はunexpectedになる() {
        let row = UserRow {
            user_id:  1,
            username: "alice".to_string(),
            email:    "broken".to_string(),
        };

        let err = User::try_from(row).unwrap_err();

        assert!(matches!(
            err.kind(),
            crate::error::InfraErrorKind::Unexpected(_)
        ));
    }
}
