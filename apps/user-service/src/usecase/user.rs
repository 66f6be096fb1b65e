//! # ユーザーユースケース
//!
//! ユーザーの取得・作成・メールアドレス変更・削除を実装する。
//!
//! 事前チェック（重複・著作記事の有無）と書き込みの間に別リクエストが
//! 割り込んだ場合は、DB 制約違反を同じ業務エラーに変換する。

use std::sync::Arc;

use scribe_domain::{
    BusinessErrorCode,
    user::{Email, NewUser, User, Username},
};
use scribe_infra::{
    InfraError,
    db::TransactionManager,
    repository::{ArticleRepository, UserRepository},
};

use crate::error::CoreError;

/// 違反した制約名を業務エラーに変換する
///
/// 対応表にない制約は DB エラーのまま返す。
fn map_constraint(err: InfraError, table: &[(&str, BusinessErrorCode)]) -> CoreError {
    let code = err.violated_constraint().and_then(|constraint| {
        table
            .iter()
            .find(|(name, _)| *name == constraint)
            .map(|(_, code)| *code)
    });

    match code {
        Some(code) => {
            tracing::info!(error_code = %code, "書き込み時の制約違反を業務エラーに変換");
            CoreError::BusinessValidation(code)
        }
        None => CoreError::Database(err),
    }
}

/// ユーザーユースケース
pub struct UserUseCaseImpl {
    user_repository:     Arc<dyn UserRepository>,
    article_repository:  Arc<dyn ArticleRepository>,
    transaction_manager: Arc<dyn TransactionManager>,
}

impl UserUseCaseImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        article_repository: Arc<dyn ArticleRepository>,
        transaction_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            user_repository,
            article_repository,
            transaction_manager,
        }
    }

    /// ユーザー名でユーザーを取得する
    #[tracing::instrument(skip_all)]
    pub async fn get_user(&self, username: &Username) -> Result<User, CoreError> {
        self.user_repository
            .find_by_username(username)
            .await?
            .ok_or(CoreError::NotFound)
    }

    /// ユーザーを作成する
    ///
    /// 1. ユーザー名またはメールアドレスが登録済みなら BE1004
    /// 2. トランザクション内で挿入し、採番された ID を含むユーザーを返す
    #[tracing::instrument(skip_all)]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, CoreError> {
        if self
            .user_repository
            .find_by_username_or_email(&new_user.username, &new_user.email)
            .await?
            .is_some()
        {
            return Err(BusinessErrorCode::DuplicateUser.into());
        }

        let duplicate = [
            ("users_username_key", BusinessErrorCode::DuplicateUser),
            ("users_email_key", BusinessErrorCode::DuplicateUser),
        ];

        let mut tx = self.transaction_manager.begin().await?;
        let user = self
            .user_repository
            .insert(&mut tx, &new_user)
            .await
            .map_err(|e| map_constraint(e, &duplicate))?;
        tx.commit().await.map_err(|e| map_constraint(e, &duplicate))?;

        tracing::info!(user_id = %user.id(), "ユーザーを作成しました");
        Ok(user)
    }

    /// メールアドレスを変更する
    ///
    /// 1. 新しいメールアドレスが誰かに使われていれば BE1006
    ///    （対象ユーザー自身の現在のアドレスも重複とみなす）
    /// 2. 対象ユーザーが存在しなければ NotFound
    /// 3. トランザクション内で更新し、更新後のユーザーを返す
    #[tracing::instrument(skip_all)]
    pub async fn update_email(&self, username: &Username, email: Email) -> Result<User, CoreError> {
        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(BusinessErrorCode::DuplicateEmail.into());
        }

        let user = self
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or(CoreError::NotFound)?
            .with_email(email);

        let duplicate = [("users_email_key", BusinessErrorCode::DuplicateEmail)];

        let mut tx = self.transaction_manager.begin().await?;
        self.user_repository
            .update_email(&mut tx, &user)
            .await
            .map_err(|e| map_constraint(e, &duplicate))?;
        tx.commit().await.map_err(|e| map_constraint(e, &duplicate))?;

        tracing::info!(user_id = %user.id(), "メールアドレスを変更しました");
        Ok(user)
    }

    /// ユーザーを削除する
    ///
    /// 1. 対象ユーザーが存在しなければ NotFound
    /// 2. 著者として記事に紐づいていれば BE1005
    /// 3. トランザクション内で削除する
    #[tracing::instrument(skip_all)]
    pub async fn delete_user(&self, username: &Username) -> Result<(), CoreError> {
        let user = self
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or(CoreError::NotFound)?;

        let articles = self.article_repository.find_by_author(user.id()).await?;
        if !articles.is_empty() {
            tracing::debug!(
                user_id = %user.id(),
                article_count = articles.len(),
                "著作記事があるため削除を拒否"
            );
            return Err(BusinessErrorCode::UserHasArticles.into());
        }

        let referenced = [(
            "article_authors_user_id_fkey",
            BusinessErrorCode::UserHasArticles,
        )];

        let mut tx = self.transaction_manager.begin().await?;
        self.user_repository
            .delete(&mut tx, user.id())
            .await
            .map_err(|e| map_constraint(e, &referenced))?;
        tx.commit().await.map_err(|e| map_constraint(e, &referenced))?;

        tracing::info!(user_id = %user.id(), "ユーザーを削除しました");
        Ok(())
    }
}
