//! # Canonical Log Line ミドルウェア
//!
//! HTTP リクエスト完了時に、そのリクエストの重要情報を1行に集約した
//! サマリログ（Canonical Log Line）を出力する tower Layer。
//!
//! ## TraceLayer との責務分離
//!
//! - TraceLayer: リクエストスパン（request_id 等）の作成
//! - CanonicalLogLineLayer: リクエスト完了サマリ（method, path, status, latency）
//!
//! TraceLayer の内側に配置すると、スパンの `request_id` が JSON ログに含まれる:
//!
//! ```text
//! TraceLayer → CanonicalLogLineLayer → handler
//! ```

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Request, Response};
use tower::{Layer, Service};

/// ヘルスチェックパスかどうかを判定する
fn is_health_check_path(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}

/// Canonical Log Line を出力する Layer
///
/// リクエスト完了時に INFO レベルで `log.type = "canonical"` マーカー付きの
/// サマリログを出力する。ヘルスチェックパスは出力対象外。
#[derive(Clone, Debug)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

/// [`CanonicalLogLineLayer`] が生成する Service
#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // poll_ready 済みの inner を使い、代わりにクローンを残す
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let path = req.uri().path().to_owned();

        if is_health_check_path(&path) {
            return Box::pin(async move { inner.call(req).await });
        }

        let method = req.method().clone();
        let start = Instant::now();

        Box::pin(async move {
            let result = inner.call(req).await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(response) => {
                    tracing::info!(
                        log.r#type = "canonical",
                        http.method = %method,
                        http.path = %path,
                        http.status_code = response.status().as_u16(),
                        http.latency_ms = latency_ms,
                        "リクエスト完了"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        log.r#type = "canonical",
                        http.method = %method,
                        http.path = %path,
                        http.latency_ms = latency_ms,
                        error.message = %err,
                        "リクエスト処理エラー"
                    );
                }
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        convert::Infallible,
        io,
        sync::{Arc, Mutex},
    };

    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::{ServiceExt, service_fn};

    use super::*;

    /// JSON ログの書き込み先
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn events(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    /// 本番と同じ JSON フォーマッタでログを捕捉する
    fn capture_json_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_writer(move || writer.clone())
            .finish();
        (tracing::subscriber::set_default(subscriber), buffer)
    }

    fn request(method: &str, path: &str) -> Request<()> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
    }

    fn response(status: StatusCode) -> Response<()> {
        Response::builder().status(status).body(()).unwrap()
    }

    #[test]
    fn test_is_health_check_pathの判定() {
        assert!(is_health_check_path("/health"));
        assert!(is_health_check_path("/health/ready"));
        assert!(!is_health_check_path("/healthz"));
        assert!(!is_health_check_path("/api/user/health"));
    }

    #[tokio::test]
    async fn test_正常リクエストで1行のcanonical_logが出力される() {
        let (_guard, logs) = capture_json_logs();
        let sut = CanonicalLogLineLayer.layer(service_fn(|_: Request<()>| async {
            Ok::<_, Infallible>(response(StatusCode::CREATED))
        }));

        sut.oneshot(request("POST", "/api/user")).await.unwrap();

        let events = logs.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["message"], "リクエスト完了");
        assert_eq!(event["log.type"], "canonical");
        assert_eq!(event["http.method"], "POST");
        assert_eq!(event["http.path"], "/api/user");
        assert_eq!(event["http.status_code"], 201);
        assert!(event["http.latency_ms"].is_u64());
    }

    #[tokio::test]
    async fn test_4xxも通常の完了ログとして出力される() {
        let (_guard, logs) = capture_json_logs();
        let sut = CanonicalLogLineLayer.layer(service_fn(|_: Request<()>| async {
            Ok::<_, Infallible>(response(StatusCode::NOT_FOUND))
        }));

        sut.oneshot(request("GET", "/api/user/ghost"))
            .await
            .unwrap();

        let events = logs.events();
        assert_eq!(events[0]["level"], "INFO");
        assert_eq!(events[0]["http.status_code"], 404);
    }

    #[tokio::test]
    async fn test_healthパスではcanonical_logが出力されない() {
        let (_guard, logs) = capture_json_logs();
        let sut = CanonicalLogLineLayer.layer(service_fn(|_: Request<()>| async {
            Ok::<_, Infallible>(response(StatusCode::OK))
        }));

        sut.clone().oneshot(request("GET", "/health")).await.unwrap();
        sut.oneshot(request("GET", "/health/ready")).await.unwrap();

        assert!(logs.events().is_empty());
    }

    #[tokio::test]
    async fn test_serviceエラー時にerrorレベルで出力される() {
        let (_guard, logs) = capture_json_logs();
        let sut = CanonicalLogLineLayer.layer(service_fn(|_: Request<()>| async {
            Err::<Response<()>, _>("connection reset".to_string())
        }));

        let result = sut.oneshot(request("DELETE", "/api/user/alice")).await;

        assert!(result.is_err());
        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["level"], "ERROR");
        assert_eq!(events[0]["error.message"], "connection reset");
        assert!(events[0].get("http.status_code").is_none());
    }
}
