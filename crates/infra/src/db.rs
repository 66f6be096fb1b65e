//! # PostgreSQL 接続とトランザクション
//!
//! 接続プールの作成、埋め込みマイグレーションの適用、書き込み用
//! トランザクション（[`TxContext`]）を提供する。
//!
//! users / article_authors への書き込みは必ず [`TxContext`] を経由する。
//! リポジトリの書き込みメソッドが `&mut TxContext` を要求するため、
//! トランザクション外の書き込みはコンパイルが通らない。
//!
//! ```rust,ignore
//! let pool = db::create_pool(&config.database_url).await?;
//! db::run_migrations(&pool).await?;
//!
//! let mut tx = PgTransactionManager::new(pool).begin().await?;
//! user_repository.delete(&mut tx, user_id).await?;
//! tx.commit().await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction, postgres::PgPoolOptions};

use crate::error::InfraError;

/// プールの最大接続数
const MAX_CONNECTIONS: u32 = 10;

/// プールから接続を取得するまでの待ち時間の上限
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// `migrations/` のスキーマを適用する（適用済みのものはスキップ）
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// 接続プールを作成する
///
/// 作成時に 1 本接続を張るため、DB に到達できなければここで失敗する。
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

/// `SELECT 1` で疎通を確認する
pub async fn ping(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// 書き込み用トランザクション
///
/// [`commit`](TxContext::commit) せずにドロップするとロールバックされる。
/// リクエストが途中で中断された場合も同様。
pub struct TxContext {
    inner: Inner,
}

enum Inner {
    Postgres(Transaction<'static, Postgres>),
    /// インメモリのモックリポジトリ用（接続を持たない）
    #[cfg(any(test, feature = "test-utils"))]
    Detached,
}

impl TxContext {
    /// モックリポジトリと組み合わせるための、接続を持たない TxContext
    #[cfg(any(test, feature = "test-utils"))]
    pub fn mock() -> Self {
        Self {
            inner: Inner::Detached,
        }
    }

    pub async fn commit(self) -> Result<(), InfraError> {
        match self.inner {
            Inner::Postgres(tx) => Ok(tx.commit().await?),
            #[cfg(any(test, feature = "test-utils"))]
            Inner::Detached => Ok(()),
        }
    }

    /// トランザクションの接続を借りる
    pub(crate) fn conn(&mut self) -> Result<&mut PgConnection, InfraError> {
        match &mut self.inner {
            Inner::Postgres(tx) => Ok(&mut **tx),
            #[cfg(any(test, feature = "test-utils"))]
            Inner::Detached => Err(InfraError::unexpected(
                "モックの TxContext は DB 接続を持ちません",
            )),
        }
    }
}

/// トランザクションの開始口
///
/// ユースケース層はプールを直接触らず、この trait から [`TxContext`] を得る。
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<TxContext, InfraError>;
}

/// [`PgPool`] からトランザクションを開始する TransactionManager
#[derive(Debug, Clone)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn begin(&self) -> Result<TxContext, InfraError> {
        let tx = self.pool.begin().await?;
        Ok(TxContext {
            inner: Inner::Postgres(tx),
        })
    }
}
