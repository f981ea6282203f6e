use std::{fmt, str::FromStr};

use shared::{
    domain::{NotificationId, UserId},
    error::{ApiError, ParseEnumError},
    records::{NewNotification, Notification},
};
use tracing::debug;

use crate::{
    directory::{require_current, UserDirectory},
    internal, ApiContext,
};

/// Tabs of the notification inbox.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotificationTab {
    #[default]
    All,
    Unread,
    Kind(String),
}

impl NotificationTab {
    fn matches(&self, notification: &Notification) -> bool {
        match self {
            NotificationTab::All => true,
            NotificationTab::Unread => !notification.is_read,
            NotificationTab::Kind(kind) => notification.kind == *kind,
        }
    }
}

impl FromStr for NotificationTab {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "all" => Ok(NotificationTab::All),
            "unread" => Ok(NotificationTab::Unread),
            "" => Err(ParseEnumError::new("NotificationTab", value)),
            kind => Ok(NotificationTab::Kind(kind.to_string())),
        }
    }
}

impl fmt::Display for NotificationTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationTab::All => f.write_str("all"),
            NotificationTab::Unread => f.write_str("unread"),
            NotificationTab::Kind(kind) => f.write_str(kind),
        }
    }
}

pub async fn list_notifications(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    tab: &NotificationTab,
) -> Result<Vec<Notification>, ApiError> {
    let user = require_current(directory).await?;
    let notifications = ctx
        .storage
        .list_notifications_for_user(user.id)
        .await
        .map_err(internal)?;
    Ok(notifications
        .into_iter()
        .filter(|notification| tab.matches(notification))
        .collect())
}

pub async fn unread_count(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
) -> Result<usize, ApiError> {
    Ok(list_notifications(ctx, directory, &NotificationTab::Unread)
        .await?
        .len())
}

pub async fn mark_read(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    notification_id: NotificationId,
) -> Result<(), ApiError> {
    let user = require_current(directory).await?;
    let updated = ctx
        .storage
        .mark_notification_read(notification_id, user.id)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!("notification {notification_id}")));
    }
    Ok(())
}

/// Marks every notification of the acting user read; returns how many changed.
pub async fn mark_all_read(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
) -> Result<u64, ApiError> {
    let user = require_current(directory).await?;
    ctx.storage
        .mark_all_notifications_read(user.id)
        .await
        .map_err(internal)
}

pub(crate) async fn notify(
    ctx: &ApiContext,
    user_id: UserId,
    kind: &str,
    title: impl Into<String>,
    message: impl Into<String>,
    action_url: Option<String>,
) -> Result<Notification, ApiError> {
    let notification = ctx
        .storage
        .insert_notification(&NewNotification {
            user_id,
            title: title.into(),
            message: message.into(),
            kind: kind.to_string(),
            action_url,
        })
        .await
        .map_err(internal)?;
    debug!(%user_id, kind, notification_id = %notification.id, "notification queued");
    Ok(notification)
}
