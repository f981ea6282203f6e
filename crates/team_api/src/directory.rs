use async_trait::async_trait;
use shared::{
    domain::UserId,
    error::{ApiError, ErrorCode},
    records::User,
};
use storage::Storage;

use crate::internal;

/// Who is on the team and who is acting. Injected wherever a roster or the
/// current user is needed.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    async fn current(&self) -> Result<Option<User>, ApiError>;
}

/// Roster backed by the `users` table; the acting user is fixed per session.
#[derive(Clone)]
pub struct StorageDirectory {
    storage: Storage,
    current: Option<UserId>,
}

impl StorageDirectory {
    pub fn new(storage: Storage, current: Option<UserId>) -> Self {
        Self { storage, current }
    }

    pub fn anonymous(storage: Storage) -> Self {
        Self::new(storage, None)
    }
}

#[async_trait]
impl UserDirectory for StorageDirectory {
    async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.storage.list_users().await.map_err(internal)
    }

    async fn current(&self) -> Result<Option<User>, ApiError> {
        let Some(user_id) = self.current else {
            return Ok(None);
        };
        self.storage.get_user(user_id).await.map_err(internal)
    }
}

/// Fixed in-memory roster.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<User>,
    current: Option<UserId>,
}

impl StaticDirectory {
    pub fn new(users: Vec<User>, current: Option<UserId>) -> Self {
        Self { users, current }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.clone())
    }

    async fn current(&self) -> Result<Option<User>, ApiError> {
        Ok(self
            .current
            .and_then(|id| self.users.iter().find(|user| user.id == id).cloned()))
    }
}

pub async fn require_current(directory: &dyn UserDirectory) -> Result<User, ApiError> {
    directory
        .current()
        .await?
        .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "sign in required"))
}

/// The acting user, provided they are an admin or media lead.
pub async fn require_lead(directory: &dyn UserDirectory) -> Result<User, ApiError> {
    let user = require_current(directory).await?;
    if !user.role.is_lead() {
        return Err(ApiError::forbidden(format!(
            "{} role cannot perform this action",
            user.role
        )));
    }
    Ok(user)
}
