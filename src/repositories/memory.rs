use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::translate::EMAIL_UNIQUE_CONSTRAINT;
use super::{ErrorContext, StoreError, UserStore, ensure_insertable, ensure_valid_id, translate};
use crate::error::ApiError;
use crate::models::User;

/// プロセス内ストア
///
/// `PgUserStore` と同じ契約（採番・UNIQUE・0件時の扱い）を守る。
/// DATABASE_URL 未設定時とテストで使う。
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Inner {
    fn email_taken(&self, email: &str, except_id: i64) -> bool {
        self.rows
            .values()
            .any(|row| row.id != except_id && row.email == email)
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.rows.is_empty()
    }
}

fn duplicate_email() -> StoreError {
    StoreError::UniqueViolation {
        constraint: Some(EMAIL_UNIQUE_CONSTRAINT.to_string()),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, mut user: User) -> Result<User, ApiError> {
        ensure_insertable(&user)?;

        let mut inner = self.inner.write().await;
        if inner.email_taken(&user.email, 0) {
            return Err(translate(duplicate_email(), ErrorContext::email(&user.email)));
        }

        inner.last_id += 1;
        user.id = inner.last_id;
        user.date_created = Some(user.date_created.unwrap_or_else(OffsetDateTime::now_utc));
        inner.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, ApiError> {
        ensure_valid_id(id)?;

        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| translate(StoreError::RowNotFound, ErrorContext::id(id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, ApiError> {
        self.inner
            .read()
            .await
            .rows
            .values()
            .find(|row| row.email == email)
            .cloned()
            .ok_or_else(|| translate(StoreError::RowNotFound, ErrorContext::email(email)))
    }

    async fn update(&self, user: User) -> Result<User, ApiError> {
        ensure_valid_id(user.id)?;
        let context = ErrorContext::id(user.id).with_email(&user.email);

        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&user.id) {
            return Err(translate(StoreError::RowNotFound, context));
        }
        if inner.email_taken(&user.email, user.id) {
            return Err(translate(duplicate_email(), context));
        }

        let row = inner
            .rows
            .get_mut(&user.id)
            .ok_or_else(|| translate(StoreError::RowNotFound, context))?;
        row.first_name.clone_from(&user.first_name);
        row.last_name.clone_from(&user.last_name);
        row.email.clone_from(&user.email);
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        ensure_valid_id(id)?;

        match self.inner.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(translate(StoreError::RowNotFound, ErrorContext::id(id))),
        }
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<User>, ApiError> {
        let users: Vec<User> = self
            .inner
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.status == status)
            .cloned()
            .collect();

        if users.is_empty() {
            return Err(translate(StoreError::RowNotFound, ErrorContext::status(status)));
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn user(first: &str, email: &str, status: &str) -> User {
        User {
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            status: status.to_string(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = MemoryUserStore::new();
        let first = store.insert(user("A", "a@b.com", "active")).await.unwrap();
        let second = store.insert(user("B", "b@b.com", "active")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.date_created.is_some());
    }

    #[tokio::test]
    async fn test_insert_keeps_supplied_timestamp() {
        let store = MemoryUserStore::new();
        let mut new_user = user("A", "a@b.com", "active");
        new_user.date_created = Some(OffsetDateTime::UNIX_EPOCH);

        let created = store.insert(new_user).await.unwrap();
        assert_eq!(created.date_created, Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[tokio::test]
    async fn test_insert_duplicate_email() {
        let store = MemoryUserStore::new();
        store.insert(user("A", "a@b.com", "active")).await.unwrap();

        let error = store
            .insert(user("Other", "a@b.com", "active"))
            .await
            .unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::BadRequest);
        assert!(error.message.contains("a@b.com"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_requires_names_and_email() {
        let store = MemoryUserStore::new();
        let error = store.insert(user("", "", "active")).await.unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::BadRequest);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let store = MemoryUserStore::new();
        let error = store.find_by_id(999_999).await.unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_find_by_id_rejects_non_positive() {
        let store = MemoryUserStore::new();
        let error = store.find_by_id(0).await.unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_update_touches_names_and_email_only() {
        let store = MemoryUserStore::new();
        let mut created = store.insert(user("A", "a@b.com", "active")).await.unwrap();
        created.password = Some("hash".to_string());
        let original_status = created.status.clone();

        let updated = store
            .update(User {
                id: created.id,
                first_name: "Z".to_string(),
                last_name: "Y".to_string(),
                email: "z@y.com".to_string(),
                status: "banned".to_string(),
                password: Some("other".to_string()),
                ..User::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Z");
        assert_eq!(updated.email, "z@y.com");
        assert_eq!(updated.status, original_status);
        assert_eq!(updated.password, None);
        assert_eq!(updated.date_created, created.date_created);
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_other_user() {
        let store = MemoryUserStore::new();
        store.insert(user("A", "a@b.com", "active")).await.unwrap();
        let mut second = store.insert(user("B", "b@b.com", "active")).await.unwrap();

        second.email = "a@b.com".to_string();
        let error = store.update(second).await.unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::BadRequest);
        assert_eq!(error.message, "email a@b.com already exists");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = MemoryUserStore::new();
        let created = store.insert(user("A", "a@b.com", "active")).await.unwrap();

        store.delete(created.id).await.unwrap();
        let error = store.delete(created.id).await.unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_find_by_status_ordered_and_empty() {
        let store = MemoryUserStore::new();
        store.insert(user("A", "a@b.com", "active")).await.unwrap();
        store.insert(user("B", "b@b.com", "inactive")).await.unwrap();
        store.insert(user("C", "c@b.com", "active")).await.unwrap();

        let active = store.find_by_status("active").await.unwrap();
        let names: Vec<&str> = active.iter().map(|u| u.first_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        let error = store.find_by_status("retired").await.unwrap_err();
        assert_eq!(error.error_kind, ErrorKind::NotFound);
    }
}
