//! # テスト用モックリポジトリ
//!
//! ユースケーステスト・API テストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! scribe-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scribe_domain::{
    article::{Article, ArticleId},
    user::{Email, NewUser, User, UserId, Username},
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    repository::{ArticleRepository, UserRepository},
};

// ===== MockUserRepository =====

/// テスト用のモック UserRepository
///
/// 一意制約（username / email）の違反を DB と同じ制約名で返す。
/// `fail_next_write` で、事前チェックをすり抜けた競合を再現できる。
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users:        Arc<Mutex<Vec<User>>>,
    next_id:      Arc<Mutex<i64>>,
    pending_fail: Arc<Mutex<Option<String>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存ユーザーを登録し、採番された ID を返す
    pub fn add_user(&self, username: &str, email: &str) -> UserId {
        let id = self.allocate_id();
        let user = User::from_db(
            id,
            Username::new(username),
            Email::new(email).unwrap(),
        );
        self.users.lock().unwrap().push(user);
        id
    }

    /// 次の書き込みを指定の制約違反で失敗させる
    pub fn fail_next_write(&self, constraint: &str) {
        *self.pending_fail.lock().unwrap() = Some(constraint.to_string());
    }

    /// 登録済みユーザーのスナップショットを返す
    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    fn allocate_id(&self) -> UserId {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        UserId::from_i64(*next_id)
    }

    fn take_pending_fail(&self) -> Result<(), InfraError> {
        match self.pending_fail.lock().unwrap().take() {
            Some(constraint) => Err(InfraError::constraint_violation(constraint)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username() == username || u.email() == email)
            .cloned())
    }

    async fn insert(&self, _tx: &mut TxContext, user: &NewUser) -> Result<User, InfraError> {
        self.take_pending_fail()?;

        {
            let users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username() == &user.username) {
                return Err(InfraError::constraint_violation("users_username_key"));
            }
            if users.iter().any(|u| u.email() == &user.email) {
                return Err(InfraError::constraint_violation("users_email_key"));
            }
        }

        let created = User::from_db(
            self.allocate_id(),
            user.username.clone(),
            user.email.clone(),
        );
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_email(&self, _tx: &mut TxContext, user: &User) -> Result<(), InfraError> {
        self.take_pending_fail()?;

        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id() != user.id() && u.email() == user.email())
        {
            return Err(InfraError::constraint_violation("users_email_key"));
        }
        if let Some(existing) = users.iter_mut().find(|u| u.id() == user.id()) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, _tx: &mut TxContext, id: UserId) -> Result<(), InfraError> {
        self.take_pending_fail()?;

        self.users.lock().unwrap().retain(|u| u.id() != id);
        Ok(())
    }
}

// ===== MockArticleRepository =====

/// テスト用のモック ArticleRepository
#[derive(Clone, Default)]
pub struct MockArticleRepository {
    articles: Arc<Mutex<Vec<Article>>>,
}

impl MockArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した著者で記事を登録する
    pub fn add_article(&self, title: &str, authors: Vec<UserId>) {
        let mut articles = self.articles.lock().unwrap();
        let id = ArticleId::from_i64(articles.len() as i64 + 1);
        articles.push(Article::from_db(
            id,
            title.to_string(),
            String::new(),
            authors,
        ));
    }
}

#[async_trait]
impl ArticleRepository for MockArticleRepository {
    async fn find_by_author(&self, user_id: UserId) -> Result<Vec<Article>, InfraError> {
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_authored_by(user_id))
            .cloned()
            .collect())
    }
}

// ===== MockTransactionManager =====

/// テスト用のモック TransactionManager
///
/// 常に `TxContext::mock()` を返す。
#[derive(Clone, Default)]
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}
