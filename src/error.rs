use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// API に公開するエラー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    InternalServerError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// クライアントへ返すエラー
///
/// 一度生成したら各レイヤーはそのまま上へ返す（再ラップしない）。
/// `status` がそのまま HTTP ステータスになる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{error_kind:?} ({status}): {message}")]
pub struct ApiError {
    pub status: u16,
    pub error_kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ApiError {
    fn new(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: error_kind.status().as_u16(),
            error_kind,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    #[must_use]
    pub fn with_causes(mut self, causes: Vec<String>) -> Self {
        self.causes = causes;
        self
    }
}

/// garde のバリデーション結果を項目ごとの cause に展開
impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        let causes = report
            .iter()
            .map(|(path, error)| format!("{path}: {error}"))
            .collect();
        Self::bad_request("invalid request body").with_causes(causes)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(message = %self.message, "内部エラー応答");
        } else {
            tracing::debug!(status = %status, message = %self.message, "エラー応答");
        }

        (status, Json(self)).into_response()
    }
}
