pub mod health;
pub mod users;

pub use health::health_check;
pub use users::{create_user, delete_user, get_user, login, patch_user, search_users, update_user};
