//! # User Service サーバー
//!
//! ユーザー名をキーにしたユーザーリソースの CRUD API を提供する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `USER_SERVICE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `USER_SERVICE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログフィルタ（デフォルト: `info,scribe=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! USER_SERVICE_PORT=14000 DATABASE_URL=postgres://... cargo run -p scribe-user-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use scribe_infra::{
    db::{self, PgTransactionManager, TransactionManager},
    repository::{
        ArticleRepository,
        PostgresArticleRepository,
        PostgresUserRepository,
        UserRepository,
    },
};
use scribe_shared::observability::{TracingConfig, init_tracing};
use scribe_user_service::{
    build_app,
    config::CoreConfig,
    handler::{ReadinessState, UserState},
    usecase::UserUseCaseImpl,
};
use tokio::net::TcpListener;

/// User Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(&TracingConfig::from_env("user-service"));
    let _tracing_guard = tracing::info_span!("app", service = "user-service").entered();

    // 設定読み込み
    let config = CoreConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "User Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // マイグレーション実行
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの実行に失敗しました")?;
    tracing::info!("マイグレーションを適用しました");

    // Readiness Check 用 State（pool が move される前に clone）
    let readiness_state = Arc::new(ReadinessState { pool: pool.clone() });

    // 依存コンポーネントを初期化
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let article_repository: Arc<dyn ArticleRepository> =
        Arc::new(PostgresArticleRepository::new(pool.clone()));
    let transaction_manager: Arc<dyn TransactionManager> =
        Arc::new(PgTransactionManager::new(pool));
    let user_state = Arc::new(UserState {
        usecase: UserUseCaseImpl::new(user_repository, article_repository, transaction_manager),
    });

    let app = build_app(user_state, readiness_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("User Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
