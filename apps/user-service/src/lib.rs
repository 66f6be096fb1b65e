//! # User Service ライブラリ
//!
//! User Service の設定・ユースケース・ハンドラを公開する。
//! シナリオテストからルーターを組み立てられるよう [`build_app`] も提供する。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handler::{
    ReadinessState,
    UserState,
    create_user,
    delete_user,
    get_user,
    health_check,
    readiness_check,
    update_user,
};
use scribe_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// ルーターを構築する
///
/// ```text
/// SetRequestId → TraceLayer → PropagateRequestId → CanonicalLogLineLayer → handler
/// ```
pub fn build_app(user_state: Arc<UserState>, readiness_state: Arc<ReadinessState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .route("/api/user", post(create_user))
        .route(
            "/api/user/{username}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(user_state)
        .layer(CanonicalLogLineLayer)
        // 下に書いたものほど外側。採番はスパン生成より先に行う
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
