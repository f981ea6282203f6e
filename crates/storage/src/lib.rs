use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use run_sheet::{
    ItemId, NewRunSheet, RunSheetItem, RunSheetMeta, RunSheetSnapshot, RunSheetStore,
    RunSheetSummary,
};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use tracing::{debug, info};

use shared::{
    domain::{
        AnnouncementId, ApplicationId, ApplicationStatus, AssignmentId, AssignmentStatus,
        MediaFileId, NotificationId, RunSheetId, RunSheetStatus, ServiceId, ServiceStatus, UserId,
    },
    error::ParseEnumError,
    records::{
        Announcement, Application, MediaFile, NewAnnouncement, NewApplication, NewMediaFile,
        NewNotification, NewService, NewUser, Notification, Service, ServiceAssignment, User,
    },
};

const USER_COLUMNS: &str = "id, email, name, phone, role, created_at, updated_at, last_login";
const SERVICE_COLUMNS: &str = "id, name, description, service_date, service_time, location, service_type, status, created_by, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str =
    "id, service_id, role, user_id, status, notes, created_at, updated_at";
const MEDIA_COLUMNS: &str = "id, name, description, file_type, file_size, file_url, thumbnail_url, category, tags, uploaded_by, created_at, updated_at";
const RUN_SHEET_COLUMNS: &str = "id, service_id, title, description, category, status, service_date, service_time, created_by, created_at, updated_at";
const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, priority, category, tags, is_pinned, is_published, published_at, expires_at, created_by, created_at, updated_at";
const APPLICATION_COLUMNS: &str = "id, full_name, phone_number, occupation, technical_skills, status, user_id, created_at, updated_at";
const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, kind, is_read, action_url, created_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every connection to `sqlite::memory:` is its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open database '{database_url}'"))?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(database_url, "storage ready");
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    // ---- users -------------------------------------------------------------

    /// Inserts a user, or refreshes name, phone and role when the email exists.
    pub async fn upsert_user(&self, new: &NewUser) -> Result<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (email, name, phone, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                role = excluded.role,
                updated_at = excluded.updated_at
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(new.email.trim().to_lowercase())
            .bind(&new.name)
            .bind(new.phone.as_deref())
            .bind(new.role.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        user_from_row(&row)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY lower(name) ASC, id ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }

    pub async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- services and assignments -----------------------------------------

    /// Inserts a service and one open assignment per role in a single
    /// transaction.
    pub async fn create_service(
        &self,
        new: &NewService,
        created_by: UserId,
        roles: &[String],
    ) -> Result<(Service, Vec<ServiceAssignment>)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO services (name, description, service_date, service_time, location, service_type, status, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {SERVICE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.name)
            .bind(new.description.as_deref())
            .bind(new.service_date)
            .bind(new.service_time)
            .bind(new.location.as_deref())
            .bind(&new.service_type)
            .bind(ServiceStatus::Scheduled.as_str())
            .bind(created_by.0)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .context("failed to insert service")?;
        let service = service_from_row(&row)?;

        let sql = format!(
            "INSERT INTO service_assignments (service_id, role, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let mut assignments = Vec::with_capacity(roles.len());
        for role in roles {
            let row = sqlx::query(&sql)
                .bind(service.id.0)
                .bind(role)
                .bind(AssignmentStatus::Pending.as_str())
                .bind(now)
                .bind(now)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("failed to add role '{role}' to service {}", service.id))?;
            assignments.push(assignment_from_row(&row)?);
        }

        tx.commit().await?;
        Ok((service, assignments))
    }

    pub async fn get_service(&self, service_id: ServiceId) -> Result<Option<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(service_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(service_from_row).transpose()
    }

    /// Services on or after `from`, earliest first.
    pub async fn list_services_from(&self, from: NaiveDate) -> Result<Vec<Service>> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services
             WHERE service_date >= ?
             ORDER BY service_date ASC, service_time ASC, id ASC"
        );
        let rows = sqlx::query(&sql).bind(from).fetch_all(&self.pool).await?;
        rows.iter().map(service_from_row).collect()
    }

    pub async fn set_service_status(
        &self,
        service_id: ServiceId,
        status: ServiceStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE services SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(service_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Option<ServiceAssignment>> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM service_assignments WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(assignment_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(assignment_from_row).transpose()
    }

    pub async fn list_assignments_for_service(
        &self,
        service_id: ServiceId,
    ) -> Result<Vec<ServiceAssignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM service_assignments WHERE service_id = ? ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(service_id.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(assignment_from_row).collect()
    }

    pub async fn list_assignments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ServiceAssignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM service_assignments WHERE user_id = ? ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(assignment_from_row).collect()
    }

    /// Puts `user_id` on the role and resets the response to pending.
    pub async fn assign_user(&self, assignment_id: AssignmentId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE service_assignments SET user_id = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(user_id.0)
        .bind(AssignmentStatus::Pending.as_str())
        .bind(Utc::now())
        .bind(assignment_id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_assignment_status(
        &self,
        assignment_id: AssignmentId,
        status: AssignmentStatus,
        notes: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE service_assignments SET status = ?, notes = COALESCE(?, notes), updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(notes)
        .bind(Utc::now())
        .bind(assignment_id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- media -------------------------------------------------------------

    pub async fn insert_media_file(
        &self,
        new: &NewMediaFile,
        uploaded_by: UserId,
    ) -> Result<MediaFile> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO media_files (name, description, file_type, file_size, file_url, thumbnail_url, category, tags, uploaded_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {MEDIA_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.name)
            .bind(new.description.as_deref())
            .bind(&new.file_type)
            .bind(
                new.file_size
                    .map(|size| i64::try_from(size).unwrap_or(i64::MAX)),
            )
            .bind(&new.file_url)
            .bind(new.thumbnail_url.as_deref())
            .bind(new.category.as_deref())
            .bind(to_json(&new.tags)?)
            .bind(uploaded_by.0)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .context("failed to insert media file")?;
        media_from_row(&row)
    }

    pub async fn get_media_file(&self, media_id: MediaFileId) -> Result<Option<MediaFile>> {
        let sql = format!("SELECT {MEDIA_COLUMNS} FROM media_files WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(media_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(media_from_row).transpose()
    }

    pub async fn list_media_files(&self) -> Result<Vec<MediaFile>> {
        let sql =
            format!("SELECT {MEDIA_COLUMNS} FROM media_files ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(media_from_row).collect()
    }

    pub async fn delete_media_file(&self, media_id: MediaFileId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media_files WHERE id = ?")
            .bind(media_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- run sheets --------------------------------------------------------

    pub async fn get_run_sheet_meta(
        &self,
        run_sheet_id: RunSheetId,
    ) -> Result<Option<RunSheetMeta>> {
        let sql = format!("SELECT {RUN_SHEET_COLUMNS} FROM run_sheets WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(run_sheet_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(run_sheet_meta_from_row).transpose()
    }

    /// Every run sheet with its item count and total minutes, newest service first.
    pub async fn list_run_sheet_summaries(&self) -> Result<Vec<RunSheetSummary>> {
        let rows = sqlx::query(
            "SELECT r.id, r.service_id, r.title, r.description, r.category, r.status,
                    r.service_date, r.service_time, r.created_by, r.created_at, r.updated_at,
                    COUNT(i.item_id) AS item_count,
                    COALESCE(SUM(i.duration_minutes), 0) AS total_minutes
             FROM run_sheets r
             LEFT JOIN run_sheet_items i ON i.run_sheet_id = r.id
             GROUP BY r.id
             ORDER BY r.service_date DESC, r.service_time DESC, r.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<RunSheetSummary> {
                Ok(RunSheetSummary {
                    meta: run_sheet_meta_from_row(row)?,
                    item_count: non_negative(row.try_get("item_count")?),
                    total_minutes: non_negative(row.try_get("total_minutes")?),
                })
            })
            .collect()
    }

    pub async fn set_run_sheet_status(
        &self,
        run_sheet_id: RunSheetId,
        status: RunSheetStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE run_sheets SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(run_sheet_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_run_sheet(&self, run_sheet_id: RunSheetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM run_sheets WHERE id = ?")
            .bind(run_sheet_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_run_sheet_items(&self, run_sheet_id: RunSheetId) -> Result<Vec<RunSheetItem>> {
        let rows = sqlx::query(
            "SELECT item_id, item_type, title, duration_minutes, notes, assigned_to, media_refs, cues
             FROM run_sheet_items
             WHERE run_sheet_id = ?
             ORDER BY item_order ASC",
        )
        .bind(run_sheet_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<RunSheetItem> {
                let duration: i64 = row.try_get("duration_minutes")?;
                Ok(RunSheetItem {
                    id: ItemId(row.try_get("item_id")?),
                    kind: parse_column(row, "item_type")?,
                    title: row.try_get("title")?,
                    duration_minutes: u32::try_from(duration)
                        .with_context(|| format!("invalid duration {duration}"))?,
                    notes: row.try_get("notes")?,
                    assigned_to: row.try_get("assigned_to")?,
                    media_refs: from_json_column(row, "media_refs")?,
                    cues: from_json_column(row, "cues")?,
                })
            })
            .collect()
    }

    // ---- announcements -----------------------------------------------------

    pub async fn insert_announcement(
        &self,
        new: &NewAnnouncement,
        created_by: UserId,
    ) -> Result<Announcement> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO announcements (title, content, priority, category, tags, is_pinned, is_published, expires_at, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.title)
            .bind(&new.content)
            .bind(new.priority.as_str())
            .bind(new.category.as_deref())
            .bind(to_json(&new.tags)?)
            .bind(new.is_pinned)
            .bind(new.expires_at)
            .bind(created_by.0)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .context("failed to insert announcement")?;
        announcement_from_row(&row)
    }

    pub async fn get_announcement(
        &self,
        announcement_id: AnnouncementId,
    ) -> Result<Option<Announcement>> {
        let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(announcement_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(announcement_from_row).transpose()
    }

    pub async fn list_announcements(&self) -> Result<Vec<Announcement>> {
        let sql = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(announcement_from_row).collect()
    }

    /// Flips a draft to published and queues `notifications` in one
    /// transaction. Returns `false`, storing nothing, when the announcement is
    /// missing or already published.
    pub async fn publish_announcement(
        &self,
        announcement_id: AnnouncementId,
        at: DateTime<Utc>,
        notifications: &[NewNotification],
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE announcements SET is_published = 1, published_at = ?, updated_at = ?
             WHERE id = ? AND is_published = 0",
        )
        .bind(at)
        .bind(at)
        .bind(announcement_id.0)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for notification in notifications {
            insert_notification_row(&mut tx, notification, at)
                .await
                .with_context(|| {
                    format!(
                        "failed to notify user {} of announcement {announcement_id}",
                        notification.user_id
                    )
                })?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn set_announcement_pinned(
        &self,
        announcement_id: AnnouncementId,
        pinned: bool,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE announcements SET is_pinned = ?, updated_at = ? WHERE id = ?")
                .bind(pinned)
                .bind(Utc::now())
                .bind(announcement_id.0)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- applications ------------------------------------------------------

    pub async fn insert_application(&self, new: &NewApplication) -> Result<Application> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO applications (full_name, phone_number, occupation, technical_skills, status, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {APPLICATION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.full_name)
            .bind(&new.phone_number)
            .bind(&new.occupation)
            .bind(&new.technical_skills)
            .bind(ApplicationStatus::Pending.as_str())
            .bind(new.user_id.map(|id| id.0))
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .context("failed to save application")?;
        let application = application_from_row(&row)?;
        debug!(application_id = %application.id, "application saved");
        Ok(application)
    }

    pub async fn get_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<Application>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(application_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(application_from_row).transpose()
    }

    /// Applications newest first, optionally narrowed to one status.
    pub async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        let filter = if status.is_some() { "WHERE status = ?" } else { "" };
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications {filter} ORDER BY created_at DESC, id DESC"
        );
        let mut query = sqlx::query(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(application_from_row).collect()
    }

    pub async fn set_application_status(
        &self,
        application_id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(application_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- notifications -----------------------------------------------------

    pub async fn insert_notification(&self, new: &NewNotification) -> Result<Notification> {
        let mut conn = self.pool.acquire().await?;
        insert_notification_row(&mut conn, new, Utc::now()).await
    }

    pub async fn list_notifications_for_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(notification_from_row).collect()
    }

    /// Marks one of `user_id`'s notifications read. Other users' rows are untouched.
    pub async fn mark_notification_read(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
                .bind(notification_id.0)
                .bind(user_id.0)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id.0)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RunSheetStore for Storage {
    async fn create_run_sheet(
        &self,
        new: &NewRunSheet,
        created_by: UserId,
        items: &[RunSheetItem],
    ) -> Result<RunSheetSnapshot> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO run_sheets (service_id, title, description, category, status, service_date, service_time, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {RUN_SHEET_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(new.service_id.map(|id| id.0))
            .bind(&new.title)
            .bind(new.description.as_deref())
            .bind(new.category.as_str())
            .bind(RunSheetStatus::Draft.as_str())
            .bind(new.service_date)
            .bind(new.service_time)
            .bind(created_by.0)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .context("failed to insert run sheet")?;
        let meta = run_sheet_meta_from_row(&row)?;
        insert_item_rows(&mut tx, meta.id, items).await?;

        tx.commit().await?;
        debug!(run_sheet_id = %meta.id, items = items.len(), "run sheet created");
        Ok(RunSheetSnapshot {
            meta,
            items: items.to_vec(),
        })
    }

    async fn load_snapshot(&self, run_sheet_id: RunSheetId) -> Result<Option<RunSheetSnapshot>> {
        let Some(meta) = self.get_run_sheet_meta(run_sheet_id).await? else {
            return Ok(None);
        };
        let items = self.load_run_sheet_items(run_sheet_id).await?;
        Ok(Some(RunSheetSnapshot { meta, items }))
    }

    async fn save_snapshot(&self, snapshot: &RunSheetSnapshot) -> Result<()> {
        let meta = &snapshot.meta;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE run_sheets
             SET service_id = ?, title = ?, description = ?, category = ?, status = ?,
                 service_date = ?, service_time = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(meta.service_id.map(|id| id.0))
        .bind(&meta.title)
        .bind(meta.description.as_deref())
        .bind(meta.category.as_str())
        .bind(meta.status.as_str())
        .bind(meta.service_date)
        .bind(meta.service_time)
        .bind(meta.updated_at)
        .bind(meta.id.0)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            bail!("run sheet {} does not exist", meta.id);
        }

        sqlx::query("DELETE FROM run_sheet_items WHERE run_sheet_id = ?")
            .bind(meta.id.0)
            .execute(&mut *tx)
            .await?;

        insert_item_rows(&mut tx, meta.id, &snapshot.items).await?;

        tx.commit().await?;
        debug!(run_sheet_id = %meta.id, items = snapshot.items.len(), "run sheet saved");
        Ok(())
    }
}

/// Writes `items` with their list position as `item_order`.
async fn insert_item_rows(
    conn: &mut SqliteConnection,
    run_sheet_id: RunSheetId,
    items: &[RunSheetItem],
) -> Result<()> {
    for (order, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO run_sheet_items (run_sheet_id, item_id, item_order, item_type, title, duration_minutes, notes, assigned_to, media_refs, cues)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run_sheet_id.0)
        .bind(item.id.as_str())
        .bind(i64::try_from(order).unwrap_or(i64::MAX))
        .bind(item.kind.as_str())
        .bind(&item.title)
        .bind(i64::from(item.duration_minutes))
        .bind(&item.notes)
        .bind(&item.assigned_to)
        .bind(to_json(&item.media_refs)?)
        .bind(to_json(&item.cues)?)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to store run sheet item '{}'", item.id))?;
    }
    Ok(())
}

async fn insert_notification_row(
    conn: &mut SqliteConnection,
    new: &NewNotification,
    at: DateTime<Utc>,
) -> Result<Notification> {
    let sql = format!(
        "INSERT INTO notifications (user_id, title, message, kind, is_read, action_url, created_at)
         VALUES (?, ?, ?, ?, 0, ?, ?)
         RETURNING {NOTIFICATION_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(new.user_id.0)
        .bind(&new.title)
        .bind(&new.message)
        .bind(&new.kind)
        .bind(new.action_url.as_deref())
        .bind(at)
        .fetch_one(&mut *conn)
        .await?;
    notification_from_row(&row)
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        role: parse_column(row, "role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login: row.try_get("last_login")?,
    })
}

fn service_from_row(row: &SqliteRow) -> Result<Service> {
    Ok(Service {
        id: ServiceId(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        service_date: row.try_get("service_date")?,
        service_time: row.try_get("service_time")?,
        location: row.try_get("location")?,
        service_type: row.try_get("service_type")?,
        status: parse_column(row, "status")?,
        created_by: UserId(row.try_get("created_by")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn assignment_from_row(row: &SqliteRow) -> Result<ServiceAssignment> {
    Ok(ServiceAssignment {
        id: AssignmentId(row.try_get("id")?),
        service_id: ServiceId(row.try_get("service_id")?),
        role: row.try_get("role")?,
        user_id: row.try_get::<Option<i64>, _>("user_id")?.map(UserId),
        status: parse_column(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn media_from_row(row: &SqliteRow) -> Result<MediaFile> {
    Ok(MediaFile {
        id: MediaFileId(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        file_type: row.try_get("file_type")?,
        file_size: row.try_get::<Option<i64>, _>("file_size")?.map(non_negative),
        file_url: row.try_get("file_url")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        category: row.try_get("category")?,
        tags: from_json_column(row, "tags")?,
        uploaded_by: UserId(row.try_get("uploaded_by")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn run_sheet_meta_from_row(row: &SqliteRow) -> Result<RunSheetMeta> {
    Ok(RunSheetMeta {
        id: RunSheetId(row.try_get("id")?),
        service_id: row.try_get::<Option<i64>, _>("service_id")?.map(ServiceId),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: parse_column(row, "category")?,
        status: parse_column(row, "status")?,
        service_date: row.try_get("service_date")?,
        service_time: row.try_get("service_time")?,
        created_by: UserId(row.try_get("created_by")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn announcement_from_row(row: &SqliteRow) -> Result<Announcement> {
    Ok(Announcement {
        id: AnnouncementId(row.try_get("id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        priority: parse_column(row, "priority")?,
        category: row.try_get("category")?,
        tags: from_json_column(row, "tags")?,
        is_pinned: row.try_get("is_pinned")?,
        is_published: row.try_get("is_published")?,
        published_at: row.try_get("published_at")?,
        expires_at: row.try_get("expires_at")?,
        created_by: UserId(row.try_get("created_by")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn application_from_row(row: &SqliteRow) -> Result<Application> {
    Ok(Application {
        id: ApplicationId(row.try_get("id")?),
        full_name: row.try_get("full_name")?,
        phone_number: row.try_get("phone_number")?,
        occupation: row.try_get("occupation")?,
        technical_skills: row.try_get("technical_skills")?,
        status: parse_column(row, "status")?,
        user_id: row.try_get::<Option<i64>, _>("user_id")?.map(UserId),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn notification_from_row(row: &SqliteRow) -> Result<Notification> {
    Ok(Notification {
        id: NotificationId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        kind: row.try_get("kind")?,
        is_read: row.try_get("is_read")?,
        action_url: row.try_get("action_url")?,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .with_context(|| format!("bad value in column '{column}'"))
}

fn from_json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).with_context(|| format!("bad json in column '{column}'"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("failed to encode json column")
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
