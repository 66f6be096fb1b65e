//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するデータ投入ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use scribe_domain::{
    article::ArticleId,
    user::{Email, NewUser, User, UserId, Username},
};
use scribe_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{PostgresUserRepository, UserRepository},
};
use sqlx::PgPool;

/// テスト用の NewUser を作成
pub fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: Username::new(username),
        email:    Email::new(email).unwrap(),
    }
}

/// ユーザーを作成してコミットする
pub async fn insert_user(pool: &PgPool, username: &str, email: &str) -> User {
    let repo = PostgresUserRepository::new(pool.clone());
    let tx_manager = PgTransactionManager::new(pool.clone());

    let mut tx = tx_manager.begin().await.unwrap();
    let user = repo
        .insert(&mut tx, &new_user(username, email))
        .await
        .expect("ユーザー作成に失敗");
    tx.commit().await.unwrap();
    user
}

/// 記事を作成し、指定ユーザーを著者として紐づける
pub async fn insert_article(pool: &PgPool, title: &str, authors: &[UserId]) -> ArticleId {
    let (article_id,): (i64,) =
        sqlx::query_as("INSERT INTO articles (title) VALUES ($1) RETURNING article_id")
            .bind(title)
            .fetch_one(pool)
            .await
            .expect("記事作成に失敗");

    for author in authors {
        sqlx::query("INSERT INTO article_authors (article_id, user_id) VALUES ($1, $2)")
            .bind(article_id)
            .bind(author.as_i64())
            .execute(pool)
            .await
            .expect("著者の紐づけに失敗");
    }

    ArticleId::from_i64(article_id)
}
