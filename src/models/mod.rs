pub mod login;
pub mod user;

pub use login::LoginRequest;
pub use user::User;

/// garde 用: 空白のみの文字列を拒否
pub(crate) fn not_blank(value: &str, _context: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}
