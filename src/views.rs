//! 出力表現の切り替え
//!
//! public: `id`, `first_name`, `last_name`, `email`, `date_created`
//! private: public + `status`
//!
//! `password` はどちらにも含めない。

use serde::Serialize;
use time::OffsetDateTime;

use crate::models::User;

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_created: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct PrivateUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_created: Option<OffsetDateTime>,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserView {
    Public(PublicUser),
    Private(PrivateUser),
}

pub fn render(user: &User, is_public: bool) -> UserView {
    if is_public {
        UserView::Public(PublicUser {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            date_created: user.date_created,
        })
    } else {
        UserView::Private(PrivateUser {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            date_created: user.date_created,
            status: user.status.clone(),
        })
    }
}

/// 各要素を個別に変換（順序は保持）
pub fn render_all(users: &[User], is_public: bool) -> Vec<UserView> {
    users.iter().map(|user| render(user, is_public)).collect()
}
