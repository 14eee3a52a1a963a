//! ドライバーエラー → `ApiError` の変換
//!
//! ストレージ固有のエラーを見るのはこのモジュールだけ。
//! ストアを差し替える場合は `From<sqlx::Error>` の対応表のみ書き換える。

use std::error::Error as StdError;

use crate::error::ApiError;

/// users.email の UNIQUE 制約名（migrations と一致させること）
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// ストアの失敗をドライバー非依存に分類したもの
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no rows returned")]
    RowNotFound,

    #[error("unique constraint violated")]
    UniqueViolation { constraint: Option<String> },

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::RowNotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_string),
                }
            }
            other => Self::Backend(Box::new(other)),
        }
    }
}

/// エラーメッセージに載せるリクエスト側の情報
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorContext<'a> {
    pub id: Option<i64>,
    pub email: Option<&'a str>,
    pub status: Option<&'a str>,
}

impl<'a> ErrorContext<'a> {
    pub fn id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn email(email: &'a str) -> Self {
        Self {
            email: Some(email),
            ..Self::default()
        }
    }

    pub fn status(status: &'a str) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: &'a str) -> Self {
        self.email = Some(email);
        self
    }
}

/// ストアエラーを API エラーへ変換
///
/// 想定外のエラーはここでログに出し、クライアントには汎用メッセージのみ返す。
pub fn translate(error: impl Into<StoreError>, context: ErrorContext<'_>) -> ApiError {
    match error.into() {
        StoreError::UniqueViolation { constraint } => {
            match (field_for_constraint(constraint.as_deref()), context.email) {
                ("email", Some(email)) => {
                    ApiError::bad_request(format!("email {email} already exists"))
                }
                (field, _) => ApiError::bad_request(format!("{field} already exists")),
            }
        }
        StoreError::RowNotFound => ApiError::not_found(not_found_message(context)),
        StoreError::Backend(source) => {
            tracing::error!(error = %source, "データベースエラー");
            ApiError::internal("database error")
        }
    }
}

fn field_for_constraint(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(EMAIL_UNIQUE_CONSTRAINT) => "email",
        _ => "value",
    }
}

fn not_found_message(context: ErrorContext<'_>) -> String {
    if let Some(id) = context.id {
        format!("user {id} not found")
    } else if let Some(status) = context.status {
        format!("no users matching status {status}")
    } else if let Some(email) = context.email {
        format!("no user with email {email}")
    } else {
        "no records matching the request".to_string()
    }
}
