//! # ユーザーハンドラ
//!
//! ユーザー名をキーにしたユーザーリソースの API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/user/{username}` - ユーザーを取得
//! - `PUT /api/user/{username}` - メールアドレスを変更
//! - `POST /api/user` - ユーザーを作成
//! - `DELETE /api/user/{username}` - ユーザーを削除
//!
//! ## 入力検証
//!
//! リクエストボディの必須・形式チェックは `validator` で行い、
//! 各ルールの `code` に業務エラーコードを持たせる。複数のルールに
//! 違反した場合は最も小さいコードを返す。
//!
//! 文字列フィールドには数値・真偽値も受け付け、文字列化してから検証する
//! （`{"email": 123}` は `"123"` として BE1003 になる）。

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
};
use scribe_domain::{
    BusinessErrorCode,
    user::{Email, NewUser, User, Username},
};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use validator::{Validate, ValidationErrors};

use crate::{error::CoreError, usecase::UserUseCaseImpl};

/// ユーザー API の共有状態
pub struct UserState {
    pub usecase: UserUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// ユーザー作成リクエスト
///
/// `username` は未指定（`null` を含む）のみを BE1001 とし、空文字列は値として受け付ける。
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "scalar_as_string")]
    #[validate(required(code = "BE1001"))]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    #[validate(required(code = "BE1002"), contains(pattern = "@", code = "BE1003"))]
    pub email:    Option<String>,
}

impl CreateUserRequest {
    fn into_new_user(self) -> Result<NewUser, CoreError> {
        self.validate().map_err(into_core_error)?;

        Ok(NewUser {
            username: Username::new(self.username.unwrap_or_default()),
            email:    Email::new(self.email.unwrap_or_default())?,
        })
    }
}

/// メールアドレス変更リクエスト
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "scalar_as_string")]
    #[validate(required(code = "BE1002"), contains(pattern = "@", code = "BE1003"))]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    fn into_email(self) -> Result<Email, CoreError> {
        self.validate().map_err(into_core_error)?;
        Ok(Email::new(self.email.unwrap_or_default())?)
    }
}

/// ユーザーレスポンス
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id:  i64,
    pub username: String,
    pub email:    String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id:  user.id().as_i64(),
            username: user.username().as_str().to_string(),
            email:    user.email().as_str().to_string(),
        }
    }
}

/// 検証エラーから最も優先度の高い業務エラーを選ぶ
fn into_core_error(errors: ValidationErrors) -> CoreError {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.code.parse::<BusinessErrorCode>().ok())
        .min()
        .map_or_else(
            || CoreError::BadRequest(errors.to_string()),
            CoreError::BusinessValidation,
        )
}

/// 文字列フィールドに入りうる JSON スカラー値
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::String(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Boolean(true) => "True".to_string(),
            Scalar::Boolean(false) => "False".to_string(),
        }
    }
}

/// スカラー値を文字列として読む（配列・オブジェクトはエラー）
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

/// JSON ボディ抽出器
///
/// `Content-Type` を問わずボディを JSON として解釈する。
/// 空ボディは全フィールド未指定（`T::default()`）として扱い、
/// 必須チェックを業務エラーとして返せるようにする。
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| CoreError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| CoreError::BadRequest(format!("JSON の形式が不正です: {e}")))
    }
}

// --- ハンドラ ---

/// GET /api/user/{username}
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<Arc<UserState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let user = state.usecase.get_user(&Username::new(username)).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/user/{username}
///
/// 入力検証 → メールアドレス重複（BE1006）→ ユーザー存在の順に判定する。
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<Arc<UserState>>,
    Path(username): Path<String>,
    LenientJson(req): LenientJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let email = req.into_email()?;
    let user = state
        .usecase
        .update_email(&Username::new(username), email)
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/user
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<Arc<UserState>>,
    LenientJson(req): LenientJson<CreateUserRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let new_user = req.into_new_user()?;
    let user = state.usecase.create_user(new_user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// DELETE /api/user/{username}
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<Arc<UserState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    state.usecase.delete_user(&Username::new(username)).await?;

    Ok(StatusCode::OK)
}
