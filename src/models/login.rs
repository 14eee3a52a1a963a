use garde::Validate;
use serde::Deserialize;

use super::not_blank;

/// ログインリクエスト（保存しない）
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(custom(not_blank))]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}
