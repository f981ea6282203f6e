use chrono::{Duration, NaiveTime};
use run_sheet::{ItemTemplate, RunSheetDocument, RunSheetTemplate, SequentialIds};
use shared::domain::{AnnouncementPriority, ItemKind, RunSheetCategory, UserRole};

use super::*;

async fn storage_with_user() -> (Storage, User) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage
        .upsert_user(&NewUser {
            email: "lead@church.test".into(),
            name: "Sarah Johnson".into(),
            phone: None,
            role: UserRole::MediaLead,
        })
        .await
        .expect("user");
    (storage, user)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).expect("date")
}

fn new_sheet(title: &str, day: u32) -> NewRunSheet {
    NewRunSheet {
        title: title.into(),
        description: None,
        service_id: None,
        category: RunSheetCategory::SundayService,
        service_date: date(day),
        service_time: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
        template: RunSheetTemplate::Blank,
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("media_team_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn upsert_user_refreshes_existing_email() {
    let (storage, user) = storage_with_user().await;
    let again = storage
        .upsert_user(&NewUser {
            email: "LEAD@church.test ".into(),
            name: "Sarah J.".into(),
            phone: Some("555-0100".into()),
            role: UserRole::Admin,
        })
        .await
        .expect("upsert");

    assert_eq!(again.id, user.id);
    assert_eq!(again.role, UserRole::Admin);
    assert_eq!(storage.list_users().await.expect("users").len(), 1);
    assert!(storage
        .find_user_by_email("lead@church.test")
        .await
        .expect("lookup")
        .is_some());
}

#[tokio::test]
async fn snapshot_round_trip_keeps_order_and_fields() {
    let (storage, user) = storage_with_user().await;
    let meta = storage
        .create_run_sheet(&new_sheet("Sunday Morning Service", 21), user.id, &[])
        .await
        .expect("sheet")
        .meta;
    assert_eq!(meta.status, RunSheetStatus::Draft);

    let mut doc = RunSheetDocument::seeded(
        meta.clone(),
        RunSheetTemplate::SundayMorning,
        SequentialIds::new(),
    );
    let last = doc.items().ids()[5].clone();
    doc.move_to(&last, 0);
    let extra = doc
        .append(
            ItemTemplate::new(ItemKind::Media, "Baptism Video", 4)
                .media(["baptism.mp4", "baptism.mp4"])
                .cues(["Roll video"]),
        )
        .id
        .clone();
    storage.save_snapshot(&doc.snapshot()).await.expect("save");

    let loaded = storage
        .load_snapshot(meta.id)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded.items, doc.snapshot().items);
    assert_eq!(loaded.items[0].id, last);
    assert_eq!(loaded.total_minutes(), 84);

    let media = loaded
        .items
        .iter()
        .find(|item| item.id == extra)
        .expect("extra item");
    assert_eq!(media.media_refs.len(), 1);
    assert_eq!(media.cues, vec!["Roll video".to_string()]);
}

#[tokio::test]
async fn saving_fewer_items_leaves_no_stale_rows() {
    let (storage, user) = storage_with_user().await;
    let meta = storage
        .create_run_sheet(&new_sheet("Prayer Night", 24), user.id, &[])
        .await
        .expect("sheet")
        .meta;
    let mut doc = RunSheetDocument::seeded(
        meta.clone(),
        RunSheetTemplate::PrayerMeeting,
        SequentialIds::new(),
    );
    storage.save_snapshot(&doc.snapshot()).await.expect("first save");

    let first = doc.items().ids()[0].clone();
    doc.remove(&first);
    storage.save_snapshot(&doc.snapshot()).await.expect("second save");

    let summaries = storage.list_run_sheet_summaries().await.expect("summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].item_count, 3);
    assert_eq!(summaries[0].total_minutes, doc.total_duration());
}

#[tokio::test]
async fn saving_unknown_sheet_fails() {
    let (storage, user) = storage_with_user().await;
    let meta = storage
        .create_run_sheet(&new_sheet("Gone", 21), user.id, &[])
        .await
        .expect("sheet")
        .meta;
    let snapshot = RunSheetSnapshot {
        meta: RunSheetMeta {
            id: RunSheetId(meta.id.0 + 100),
            ..meta
        },
        items: Vec::new(),
    };
    assert!(storage.save_snapshot(&snapshot).await.is_err());
}

#[tokio::test]
async fn empty_sheets_summarize_to_zero() {
    let (storage, user) = storage_with_user().await;
    storage
        .create_run_sheet(&new_sheet("Older", 14), user.id, &[])
        .await
        .expect("older");
    storage
        .create_run_sheet(&new_sheet("Newer", 21), user.id, &[])
        .await
        .expect("newer");

    let summaries = storage.list_run_sheet_summaries().await.expect("summaries");
    assert_eq!(summaries[0].meta.title, "Newer");
    assert!(summaries.iter().all(|s| s.item_count == 0 && s.total_minutes == 0));
}

#[tokio::test]
async fn created_sheet_stores_its_seed_items() {
    let (storage, user) = storage_with_user().await;
    let seed = RunSheetTemplate::SundayMorning
        .seed(SequentialIds::new())
        .into_items();
    let created = storage
        .create_run_sheet(&new_sheet("Sunday Morning Service", 21), user.id, &seed)
        .await
        .expect("sheet");

    let loaded = storage
        .load_snapshot(created.meta.id)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded, created);
    assert_eq!(loaded.total_minutes(), 80);
    assert!(loaded.items[3].media_refs.contains("sermon-slides.pptx"));
}

#[tokio::test]
async fn failed_item_insert_leaves_no_sheet_behind() {
    let (storage, user) = storage_with_user().await;
    let mut seed = RunSheetTemplate::PrayerMeeting
        .seed(SequentialIds::new())
        .into_items();
    seed[1].id = seed[0].id.clone();

    assert!(storage
        .create_run_sheet(&new_sheet("Prayer Night", 24), user.id, &seed)
        .await
        .is_err());
    assert!(storage
        .list_run_sheet_summaries()
        .await
        .expect("summaries")
        .is_empty());
}

#[tokio::test]
async fn services_list_in_date_order_from_a_day() {
    let (storage, user) = storage_with_user().await;
    for (name, day) in [("Youth", 26), ("Sunday", 21), ("Last week", 14)] {
        storage
            .create_service(
                &NewService {
                    name: name.into(),
                    description: None,
                    service_date: date(day),
                    service_time: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
                    location: Some("Main Sanctuary".into()),
                    service_type: "service".into(),
                },
                user.id,
                &[],
            )
            .await
            .expect("service");
    }

    let services = storage.list_services_from(date(20)).await.expect("services");
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Sunday", "Youth"]);
    assert_eq!(services[0].status, ServiceStatus::Scheduled);
}

#[tokio::test]
async fn assignment_status_updates_keep_notes_when_absent() {
    let (storage, user) = storage_with_user().await;
    let (service, assignments) = storage
        .create_service(
            &NewService {
                name: "Sunday".into(),
                description: None,
                service_date: date(21),
                service_time: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
                location: None,
                service_type: "service".into(),
            },
            user.id,
            &["Camera 1".to_string(), "Sound".to_string()],
        )
        .await
        .expect("service");
    assert_eq!(
        storage
            .list_assignments_for_service(service.id)
            .await
            .expect("roles"),
        assignments
    );
    let camera = assignments[0].clone();
    assert_eq!(camera.role, "Camera 1");
    assert!(!camera.is_filled());

    assert!(storage.assign_user(camera.id, user.id).await.expect("assign"));
    assert!(storage
        .set_assignment_status(camera.id, AssignmentStatus::Declined, Some("Out of town"))
        .await
        .expect("decline"));
    assert!(storage
        .set_assignment_status(camera.id, AssignmentStatus::Confirmed, None)
        .await
        .expect("confirm"));

    let stored = storage
        .get_assignment(camera.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored.user_id, Some(user.id));
    assert_eq!(stored.status, AssignmentStatus::Confirmed);
    assert_eq!(stored.notes.as_deref(), Some("Out of town"));
    assert_eq!(
        storage
            .list_assignments_for_user(user.id)
            .await
            .expect("mine")
            .len(),
        1
    );
}

#[tokio::test]
async fn media_tags_round_trip() {
    let (storage, user) = storage_with_user().await;
    let file = storage
        .insert_media_file(
            &NewMediaFile {
                name: "Worship Background".into(),
                file_type: "video".into(),
                file_size: Some(52_428_800),
                file_url: "https://cdn.test/bg.mp4".into(),
                category: Some("worship".into()),
                tags: vec!["background".into(), "loop".into()],
                ..NewMediaFile::default()
            },
            user.id,
        )
        .await
        .expect("media");

    let loaded = storage
        .get_media_file(file.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(loaded.tags, ["background", "loop"]);
    assert_eq!(loaded.file_size, Some(52_428_800));

    assert!(storage.delete_media_file(file.id).await.expect("delete"));
    assert!(!storage.delete_media_file(file.id).await.expect("delete again"));
}

#[tokio::test]
async fn announcements_publish_and_pin() {
    let (storage, user) = storage_with_user().await;
    let announcement = storage
        .insert_announcement(
            &NewAnnouncement {
                title: "Youth retreat".into(),
                content: "Sign up by Friday".into(),
                priority: AnnouncementPriority::High,
                category: Some("events".into()),
                tags: vec!["youth".into()],
                is_pinned: false,
                expires_at: Some(Utc::now() + Duration::days(7)),
            },
            user.id,
        )
        .await
        .expect("announcement");
    assert!(!announcement.is_published);

    let now = Utc::now();
    assert!(storage
        .publish_announcement(announcement.id, now, &[])
        .await
        .expect("publish"));
    assert!(!storage
        .publish_announcement(announcement.id, now, &[])
        .await
        .expect("publish again"));
    assert!(storage
        .set_announcement_pinned(announcement.id, true)
        .await
        .expect("pin"));

    let stored = storage
        .get_announcement(announcement.id)
        .await
        .expect("get")
        .expect("present");
    assert!(stored.is_published && stored.is_pinned);
    assert!(stored.is_visible_at(now));
}

#[tokio::test]
async fn applications_filter_by_status_newest_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut ids = Vec::new();
    for name in ["Ada", "Grace", "Linus"] {
        let application = storage
            .insert_application(&NewApplication {
                full_name: name.into(),
                phone_number: "555".into(),
                occupation: "Engineer".into(),
                technical_skills: "OBS".into(),
                user_id: None,
            })
            .await
            .expect("application");
        assert_eq!(application.status, ApplicationStatus::Pending);
        ids.push(application.id);
    }
    storage
        .set_application_status(ids[1], ApplicationStatus::Approved)
        .await
        .expect("approve");

    let pending = storage
        .list_applications(Some(ApplicationStatus::Pending))
        .await
        .expect("pending");
    let names: Vec<&str> = pending.iter().map(|a| a.full_name.as_str()).collect();
    assert_eq!(names, ["Linus", "Ada"]);

    let all = storage.list_applications(None).await.expect("all");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn notifications_mark_read_only_for_owner() {
    let (storage, user) = storage_with_user().await;
    let other = storage
        .upsert_user(&NewUser {
            email: "mike@church.test".into(),
            name: "Mike Davis".into(),
            phone: None,
            role: UserRole::Volunteer,
        })
        .await
        .expect("other");

    let mut created = Vec::new();
    for title in ["Schedule updated", "New media"] {
        created.push(
            storage
                .insert_notification(&NewNotification {
                    user_id: user.id,
                    title: title.into(),
                    message: "details".into(),
                    kind: "schedule".into(),
                    action_url: None,
                })
                .await
                .expect("notification"),
        );
    }

    assert!(!storage
        .mark_notification_read(created[0].id, other.id)
        .await
        .expect("foreign mark"));
    assert!(storage
        .mark_notification_read(created[0].id, user.id)
        .await
        .expect("own mark"));
    assert_eq!(
        storage
            .mark_all_notifications_read(user.id)
            .await
            .expect("mark all"),
        1
    );
    let listed = storage
        .list_notifications_for_user(user.id)
        .await
        .expect("list");
    assert!(listed.iter().all(|n| n.is_read));
}

#[tokio::test]
async fn failed_notification_rolls_back_the_publish() {
    let (storage, user) = storage_with_user().await;
    let announcement = storage
        .insert_announcement(
            &NewAnnouncement {
                title: "Rehearsal moved".into(),
                content: "Thursday 7pm".into(),
                priority: AnnouncementPriority::Normal,
                category: None,
                tags: Vec::new(),
                is_pinned: false,
                expires_at: None,
            },
            user.id,
        )
        .await
        .expect("announcement");
    let notice = |user_id| NewNotification {
        user_id,
        title: "Rehearsal moved".into(),
        message: "Thursday 7pm".into(),
        kind: "announcement".into(),
        action_url: None,
    };

    let result = storage
        .publish_announcement(
            announcement.id,
            Utc::now(),
            &[notice(user.id), notice(UserId(user.id.0 + 100))],
        )
        .await;
    assert!(result.is_err());

    let stored = storage
        .get_announcement(announcement.id)
        .await
        .expect("get")
        .expect("present");
    assert!(!stored.is_published);
    assert_eq!(stored.published_at, None);
    assert!(storage
        .list_notifications_for_user(user.id)
        .await
        .expect("notifications")
        .is_empty());

    assert!(storage
        .publish_announcement(announcement.id, Utc::now(), &[notice(user.id)])
        .await
        .expect("retry"));
    assert_eq!(
        storage
            .list_notifications_for_user(user.id)
            .await
            .expect("notifications")
            .len(),
        1
    );
}
