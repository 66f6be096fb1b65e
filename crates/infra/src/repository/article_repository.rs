//! # ArticleRepository
//!
//! 記事と著者の関係を参照するリポジトリ。
//! ユーザー削除時の「著作記事があるか」の判定に使用する。

use async_trait::async_trait;
use scribe_domain::{
    article::{Article, ArticleId},
    user::UserId,
};
use sqlx::PgPool;

use crate::error::InfraError;

/// 記事リポジトリトレイト
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// 指定ユーザーが著者に含まれる記事を取得する
    ///
    /// 共著の記事も含む。各記事の `authors` には全著者が入る。
    async fn find_by_author(&self, user_id: UserId) -> Result<Vec<Article>, InfraError>;
}

/// PostgreSQL 実装の ArticleRepository
#[derive(Debug, Clone)]
pub struct PostgresArticleRepository {
    pool: PgPool,
}

impl PostgresArticleRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    article_id: i64,
    title:      String,
    content:    String,
    authors:    Vec<i64>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article::from_db(
            ArticleId::from_i64(row.article_id),
            row.title,
            row.content,
            row.authors.into_iter().map(UserId::from_i64).collect(),
        )
    }
}

#[async_trait]
impl ArticleRepository for PostgresArticleRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%user_id))]
    async fn find_by_author(&self, user_id: UserId) -> Result<Vec<Article>, InfraError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT
                a.article_id,
                a.title,
                a.content,
                ARRAY(
                    SELECT aa2.user_id
                    FROM article_authors aa2
                    WHERE aa2.article_id = a.article_id
                    ORDER BY aa2.user_id
                ) AS authors
            FROM articles a
            WHERE EXISTS (
                SELECT 1
                FROM article_authors aa
                WHERE aa.article_id = a.article_id AND aa.user_id = $1
            )
            ORDER BY a.article_id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }
}
