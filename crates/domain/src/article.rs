//! # 記事
//!
//! ユーザー削除の可否判定に必要な範囲で記事エンティティを定義する。
//! 記事と著者（ユーザー）は多対多の関係を持つ。

use crate::user::UserId;

define_serial_id! {
    /// 記事 ID
    pub struct ArticleId;
}

/// 記事エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    id:      ArticleId,
    title:   String,
    content: String,
    authors: Vec<UserId>,
}

impl Article {
    /// 既存のデータから記事を復元する（データベースから取得時）
    pub fn from_db(
        id: ArticleId,
        title: String,
        content: String,
        authors: Vec<UserId>,
    ) -> Self {
        Self {
            id,
            title,
            content,
            authors,
        }
    }

    pub fn id(&self) -> ArticleId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn authors(&self) -> &[UserId] {
        &self.authors
    }

    /// 指定ユーザーが著者に含まれるか
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.authors.contains(&user_id)
    }
}
