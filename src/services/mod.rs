pub mod password;
pub mod users;

pub use users::UserService;
