use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use shared::{
    domain::{matches_search, AnnouncementId, AnnouncementPriority, Choice},
    error::ApiError,
    records::{Announcement, NewAnnouncement, NewNotification},
};
use tracing::info;

use crate::{
    directory::{require_lead, UserDirectory},
    internal, required, ApiContext,
};

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    /// Matched against title, content and tags.
    pub search: String,
    pub priority: Choice<AnnouncementPriority>,
    pub category: Choice<String>,
}

impl AnnouncementFilter {
    fn matches(&self, announcement: &Announcement) -> bool {
        let mut haystacks = vec![announcement.title.as_str(), announcement.content.as_str()];
        haystacks.extend(announcement.tags.iter().map(String::as_str));
        matches_search(&self.search, &haystacks)
            && self.priority.matches(&announcement.priority)
            && self.category.matches_opt(announcement.category.as_ref())
    }
}

/// Stores a draft announcement. Nobody sees it until it is published.
pub async fn create_announcement(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    mut new: NewAnnouncement,
) -> Result<Announcement, ApiError> {
    let author = require_lead(directory).await?;
    new.title = required(&new.title, "title")?;
    new.content = required(&new.content, "content")?;

    let announcement = ctx
        .storage
        .insert_announcement(&new, author.id)
        .await
        .map_err(internal)?;
    info!(
        announcement_id = %announcement.id,
        priority = %announcement.priority,
        "announcement drafted"
    );
    Ok(announcement)
}

/// Publishes an announcement and notifies every other team member. The flag
/// and the notifications are stored together, so a failed publish can be
/// retried. Publishing twice is a no-op.
pub async fn publish_announcement(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    announcement_id: AnnouncementId,
) -> Result<Announcement, ApiError> {
    let publisher = require_lead(directory).await?;
    let announcement = load_announcement(ctx, announcement_id).await?;
    if announcement.is_published {
        return Ok(announcement);
    }

    let message = preview(&announcement.content);
    let action_url = format!("/announcements/{announcement_id}");
    let notifications: Vec<NewNotification> = directory
        .list()
        .await?
        .into_iter()
        .filter(|member| member.id != publisher.id)
        .map(|member| NewNotification {
            user_id: member.id,
            title: announcement.title.clone(),
            message: message.clone(),
            kind: "announcement".into(),
            action_url: Some(action_url.clone()),
        })
        .collect();

    let published = ctx
        .storage
        .publish_announcement(announcement_id, Utc::now(), &notifications)
        .await
        .map_err(internal)?;
    if published {
        info!(%announcement_id, notified = notifications.len(), "announcement published");
    }

    load_announcement(ctx, announcement_id).await
}

pub async fn pin_announcement(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    announcement_id: AnnouncementId,
    pinned: bool,
) -> Result<(), ApiError> {
    require_lead(directory).await?;
    let updated = ctx
        .storage
        .set_announcement_pinned(announcement_id, pinned)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!("announcement {announcement_id}")));
    }
    Ok(())
}

/// Published, unexpired announcements matching `filter`: pinned first, then newest.
pub async fn announcement_feed(
    ctx: &ApiContext,
    filter: &AnnouncementFilter,
    now: DateTime<Utc>,
) -> Result<Vec<Announcement>, ApiError> {
    let mut feed: Vec<_> = ctx
        .storage
        .list_announcements()
        .await
        .map_err(internal)?
        .into_iter()
        .filter(|announcement| announcement.is_visible_at(now) && filter.matches(announcement))
        .collect();
    feed.sort_by_key(|announcement| {
        (
            Reverse(announcement.is_pinned),
            Reverse(announcement.created_at),
            Reverse(announcement.id),
        )
    });
    Ok(feed)
}

async fn load_announcement(
    ctx: &ApiContext,
    announcement_id: AnnouncementId,
) -> Result<Announcement, ApiError> {
    ctx.storage
        .get_announcement(announcement_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("announcement {announcement_id}")))
}

fn preview(content: &str) -> String {
    const MAX_CHARS: usize = 120;
    if content.chars().count() <= MAX_CHARS {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(MAX_CHARS).collect();
    cut.push_str("...");
    cut
}
