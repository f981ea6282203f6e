//! Service layer for the media team: run sheets, schedule, media catalog,
//! announcements, volunteer applications, notifications and the roster.
//!
//! Every operation returns `Result<_, ApiError>`; storage failures surface as
//! `ErrorCode::Internal`.

use shared::error::{ApiError, ErrorCode};
use storage::Storage;

mod announcements;
mod applications;
mod directory;
mod media;
mod notifications;
mod run_sheets;
mod schedule;
mod team;

pub use announcements::{
    announcement_feed, create_announcement, pin_announcement, publish_announcement,
    AnnouncementFilter,
};
pub use applications::{
    list_applications, review_application, submit_application, validate_application,
};
pub use directory::{
    require_current, require_lead, StaticDirectory, StorageDirectory, UserDirectory,
};
pub use media::{delete_media, register_media, search_media, MediaFilter};
pub use notifications::{
    list_notifications, mark_all_read, mark_read, unread_count, NotificationTab,
};
pub use run_sheets::{
    create_run_sheet, delete_run_sheet, export_run_sheet, list_run_sheets, open_run_sheet,
    save_run_sheet, set_run_sheet_status, RunSheetFilter,
};
pub use schedule::{
    assign_role, cancel_service, create_service, get_service, respond_to_assignment,
    upcoming_services, ScheduledService,
};
pub use team::{add_member, list_members, NewMember, TeamFilter};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

impl ApiContext {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

/// Trims `value` and rejects it when nothing is left.
fn required(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
