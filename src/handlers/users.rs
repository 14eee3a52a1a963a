use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{LoginRequest, User, not_blank};
use crate::state::AppState;
use crate::views::{self, UserView};

/// 公開ビュー切り替えヘッダー（値が `true` のときのみ有効）
pub const PUBLIC_HEADER: &str = "x-public";

/// 作成・更新リクエスト
///
/// 未指定の項目は空文字として扱う（部分更新では「変更なし」）。
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserRequest {
    #[garde(custom(not_blank))]
    pub first_name: String,
    #[garde(custom(not_blank))]
    pub last_name: String,
    #[garde(custom(not_blank), contains("@"))]
    pub email: String,
    #[garde(skip)]
    pub status: String,
    #[garde(skip)]
    pub password: String,
}

impl UserRequest {
    fn into_user(self, id: i64) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            date_created: None,
            status: self.status,
            password: Some(self.password).filter(|p| !p.is_empty()),
        }
    }

    /// 部分更新のバリデーション: 指定された email の形式のみ確認
    fn validate_patch(&self) -> Result<(), ApiError> {
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(ApiError::bad_request("invalid request body")
                .with_causes(vec!["email: not a valid email address".to_string()]));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

/// ユーザー作成ハンドラー
///
/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let request = json_body(body)?;
    request.validate()?;

    let user = state.users.create(request.into_user(0)).await?;

    tracing::info!(user_id = user.id, "ユーザー作成成功");

    Ok((
        StatusCode::CREATED,
        Json(views::render(&user, is_public(&headers))),
    ))
}

/// ユーザー取得ハンドラー
///
/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let user_id = parse_user_id(&raw_id)?;
    let user = state.users.get(user_id).await?;

    Ok(Json(views::render(&user, is_public(&headers))))
}

/// ユーザー全項目更新ハンドラー
///
/// PUT /users/{user_id}
///
/// 氏名・メールアドレスは全て必須（欠けていれば `bad_request`）
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let user_id = parse_user_id(&raw_id)?;
    let request = json_body(body)?;
    request.validate()?;

    apply_update(&state, &headers, user_id, request, false).await
}

/// ユーザー部分更新ハンドラー
///
/// PATCH /users/{user_id}
pub async fn patch_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let user_id = parse_user_id(&raw_id)?;
    let request = json_body(body)?;
    request.validate_patch()?;

    apply_update(&state, &headers, user_id, request, true).await
}

async fn apply_update(
    state: &AppState,
    headers: &HeaderMap,
    user_id: i64,
    request: UserRequest,
    is_partial: bool,
) -> Result<Json<UserView>, ApiError> {
    let user = state
        .users
        .update(is_partial, request.into_user(user_id))
        .await?;

    tracing::info!(user_id, is_partial, "ユーザー更新成功");

    Ok(Json(views::render(&user, is_public(headers))))
}

/// ユーザー削除ハンドラー
///
/// DELETE /users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let user_id = parse_user_id(&raw_id)?;
    state.users.delete(user_id).await?;

    tracing::info!(user_id, "ユーザー削除成功");

    Ok(Json(DeleteResponse { status: "deleted" }))
}

/// ステータス検索ハンドラー
///
/// GET /users/search?status={status}
pub async fn search_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let Query(params) = query.map_err(|e| {
        tracing::debug!(error = %e, "クエリパラメータ不正");
        ApiError::bad_request("status query parameter is required")
    })?;

    let users = state.users.search(&params.status).await?;

    Ok(Json(views::render_all(&users, is_public(&headers))))
}

/// ログインハンドラー
///
/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let request = json_body(body)?;
    request.validate()?;

    let user = state.users.login(&request).await?;

    Ok(Json(views::render(&user, is_public(&headers))))
}

/// パスの user_id を10進整数として解釈
fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("user id should be a number"))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(e) => {
            tracing::debug!(error = %e, "JSON ボディ不正");
            Err(ApiError::bad_request("invalid json body"))
        }
    }
}

fn is_public(headers: &HeaderMap) -> bool {
    headers
        .get(PUBLIC_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}
