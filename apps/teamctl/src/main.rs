use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use run_sheet::{ItemId, ItemPatch, ItemTemplate, NewRunSheet, RunSheetDocument, RunSheetTemplate};
use shared::{
    domain::{
        AnnouncementId, AnnouncementPriority, ApplicationId, ApplicationStatus, AssignmentId,
        Choice, ItemKind, MediaFileId, NotificationId, RunSheetCategory, RunSheetId,
        RunSheetStatus, ServiceId, UserRole,
    },
    error::{ApiError, ApiException},
    records::{ApplicationForm, NewAnnouncement, NewMediaFile, NewService},
};
use storage::Storage;
use team_api::{ApiContext, StorageDirectory};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url, SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(name = "teamctl", about = "Media team run sheets, schedule and roster")]
struct Cli {
    /// Overrides the configured database url.
    #[arg(long)]
    database_url: Option<String>,
    /// Email of the team member to act as.
    #[arg(long = "as-user", global = true)]
    as_user: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    RunSheet(RunSheetCommand),
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Service(ServiceCommand),
    /// Put a team member on a service role.
    Assign {
        assignment_id: i64,
        email: String,
    },
    /// Confirm one of your assignments, or decline it with `--decline`.
    Respond {
        assignment_id: i64,
        #[arg(long)]
        decline: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    #[command(subcommand)]
    Media(MediaCommand),
    #[command(subcommand)]
    Announcement(AnnouncementCommand),
    /// Submit a volunteer application.
    Apply {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        occupation: String,
        #[arg(long)]
        skills: String,
    },
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Subcommand, Debug)]
enum RunSheetCommand {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "10:00:00")]
        time: NaiveTime,
        #[arg(long, default_value = "sunday-service")]
        category: RunSheetCategory,
        #[arg(long, default_value = "blank")]
        template: RunSheetTemplate,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        service_id: Option<i64>,
    },
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: Choice<RunSheetStatus>,
        #[arg(long, default_value = "all")]
        category: Choice<RunSheetCategory>,
    },
    Show {
        run_sheet_id: i64,
    },
    Add {
        run_sheet_id: i64,
        #[command(flatten)]
        item: NewItemArgs,
    },
    /// Move an item; out-of-range positions clamp to the ends.
    Move {
        run_sheet_id: i64,
        item_id: String,
        #[arg(allow_hyphen_values = true)]
        index: i64,
    },
    Remove {
        run_sheet_id: i64,
        item_id: String,
    },
    Update {
        run_sheet_id: i64,
        item_id: String,
        #[command(flatten)]
        patch: PatchArgs,
    },
    Status {
        run_sheet_id: i64,
        status: RunSheetStatus,
    },
    Export {
        run_sheet_id: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Delete {
        run_sheet_id: i64,
    },
    Templates,
}

#[derive(Args, Debug)]
struct NewItemArgs {
    #[arg(long, default_value = "announcement")]
    kind: ItemKind,
    #[arg(long, default_value = "New Item")]
    title: String,
    #[arg(long, default_value_t = 5)]
    minutes: u32,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    assigned_to: Option<String>,
    #[arg(long = "media")]
    media: Vec<String>,
    #[arg(long = "cue")]
    cues: Vec<String>,
}

impl NewItemArgs {
    fn into_template(self) -> ItemTemplate {
        let mut template = ItemTemplate::new(self.kind, self.title, self.minutes)
            .media(self.media)
            .cues(self.cues);
        if let Some(notes) = self.notes {
            template = template.notes(notes);
        }
        if let Some(assigned_to) = self.assigned_to {
            template = template.assigned_to(assigned_to);
        }
        template
    }
}

#[derive(Args, Debug)]
struct PatchArgs {
    #[arg(long)]
    kind: Option<ItemKind>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    minutes: Option<u32>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    assigned_to: Option<String>,
    /// Replaces the item's media references.
    #[arg(long = "media")]
    media: Vec<String>,
    #[arg(long, conflicts_with = "media")]
    clear_media: bool,
    /// Replaces the item's cues.
    #[arg(long = "cue")]
    cues: Vec<String>,
    #[arg(long, conflicts_with = "cues")]
    clear_cues: bool,
}

impl From<PatchArgs> for ItemPatch {
    fn from(args: PatchArgs) -> Self {
        let media_refs = (args.clear_media || !args.media.is_empty())
            .then(|| args.media.into_iter().collect());
        let cues = (args.clear_cues || !args.cues.is_empty()).then_some(args.cues);
        ItemPatch {
            kind: args.kind,
            title: args.title,
            duration_minutes: args.minutes,
            notes: args.notes,
            assigned_to: args.assigned_to,
            media_refs,
            cues,
        }
    }
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Defaults to volunteer for new members and keeps the stored role
        /// for existing ones.
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long)]
        phone: Option<String>,
    },
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        role: Choice<UserRole>,
    },
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: NaiveTime,
        #[arg(long = "type", default_value = "sunday")]
        service_type: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Production role to staff; repeat for several.
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    List {
        /// First day to include; defaults to today.
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    Cancel {
        service_id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum MediaCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        file_type: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        size: Option<u64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Search {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        file_type: Option<String>,
    },
    Delete {
        media_id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum AnnouncementCommand {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "normal")]
        priority: AnnouncementPriority,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        pinned: bool,
        /// RFC 3339 timestamp after which the announcement is hidden.
        #[arg(long)]
        expires: Option<DateTime<Utc>>,
    },
    Publish {
        announcement_id: i64,
    },
    Pin {
        announcement_id: i64,
        #[arg(long)]
        unpin: bool,
    },
    Feed {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        priority: Choice<AnnouncementPriority>,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ApplicationsCommand {
    List {
        #[arg(long, default_value = "pending")]
        status: Choice<ApplicationStatus>,
    },
    Review {
        application_id: i64,
        status: ApplicationStatus,
    },
}

#[derive(Subcommand, Debug)]
enum NotificationsCommand {
    List {
        #[arg(long, default_value = "all")]
        tab: team_api::NotificationTab,
    },
    Read {
        notification_id: i64,
    },
    ReadAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (settings, settings_error) = load_settings();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if let Some(error) = settings_error {
        warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file");
    }

    let raw_database_url = cli
        .database_url
        .as_deref()
        .unwrap_or(&settings.database_url);
    let database_url = prepare_database_url(raw_database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let acting_user = cli.as_user.or(settings.acting_user);
    let directory = sign_in(&storage, acting_user.as_deref()).await?;
    let ctx = ApiContext::new(storage);

    match cli.command {
        Command::RunSheet(command) => run_sheet_command(&ctx, &directory, command).await,
        Command::User(command) => user_command(&ctx, &directory, command).await,
        Command::Service(command) => service_command(&ctx, &directory, command).await,
        Command::Assign {
            assignment_id,
            email,
        } => {
            let user = ctx
                .storage
                .find_user_by_email(&email)
                .await?
                .with_context(|| format!("no team member with email '{email}'"))?;
            let assignment = api(
                team_api::assign_role(&ctx, &directory, AssignmentId(assignment_id), user.id)
                    .await,
            )?;
            println!(
                "assigned {} to {} (status={})",
                user.name, assignment.role, assignment.status
            );
            Ok(())
        }
        Command::Respond {
            assignment_id,
            decline,
            notes,
        } => {
            let assignment = api(
                team_api::respond_to_assignment(
                    &ctx,
                    &directory,
                    AssignmentId(assignment_id),
                    !decline,
                    notes.as_deref(),
                )
                .await,
            )?;
            println!("assignment {} is now {}", assignment.id, assignment.status);
            Ok(())
        }
        Command::Media(command) => media_command(&ctx, &directory, command).await,
        Command::Announcement(command) => announcement_command(&ctx, &directory, command).await,
        Command::Apply {
            full_name,
            phone,
            occupation,
            skills,
        } => {
            let form = ApplicationForm {
                full_name,
                phone_number: phone,
                occupation,
                technical_skills: skills,
            };
            let submitter = api(team_api::require_current(&directory).await)
                .ok()
                .map(|user| user.id);
            let application = api(team_api::submit_application(&ctx, &form, submitter).await)?;
            println!("application {} received", application.id);
            Ok(())
        }
        Command::Applications(command) => applications_command(&ctx, &directory, command).await,
        Command::Notifications(command) => {
            notifications_command(&ctx, &directory, command).await
        }
    }
}

async fn sign_in(storage: &Storage, email: Option<&str>) -> Result<StorageDirectory> {
    let Some(email) = email else {
        return Ok(StorageDirectory::anonymous(storage.clone()));
    };
    let Some(user) = storage.find_user_by_email(email).await? else {
        bail!("no team member with email '{email}'");
    };
    storage.record_login(user.id, Utc::now()).await?;
    info!(user_id = %user.id, role = %user.role, "acting as team member");
    Ok(StorageDirectory::new(storage.clone(), Some(user.id)))
}

async fn run_sheet_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: RunSheetCommand,
) -> Result<()> {
    match command {
        RunSheetCommand::Create {
            title,
            date,
            time,
            category,
            template,
            description,
            service_id,
        } => {
            let new = NewRunSheet {
                title,
                description,
                service_id: service_id.map(ServiceId),
                category,
                service_date: date,
                service_time: time,
                template,
            };
            let document = api(team_api::create_run_sheet(ctx, directory, new).await)?;
            println!(
                "created run_sheet_id={} items={} total={}",
                document.meta().id,
                document.items().len(),
                format_minutes(document.total_duration())
            );
        }
        RunSheetCommand::List {
            search,
            status,
            category,
        } => {
            let filter = team_api::RunSheetFilter {
                search,
                status,
                category,
            };
            for summary in api(team_api::list_run_sheets(ctx, &filter).await)? {
                let meta = &summary.meta;
                println!(
                    "{:>4}  {}  {:<8}  {:<14}  {:>3} items  {:>7}  {}",
                    meta.id,
                    meta.service_date,
                    meta.status,
                    meta.category,
                    summary.item_count,
                    format_minutes(summary.total_minutes),
                    meta.title
                );
            }
        }
        RunSheetCommand::Show { run_sheet_id } => {
            let document = api(team_api::open_run_sheet(ctx, RunSheetId(run_sheet_id)).await)?;
            print_document(&document);
        }
        RunSheetCommand::Add { run_sheet_id, item } => {
            edit_run_sheet(ctx, run_sheet_id, |document| {
                let added = document.append(item.into_template());
                println!("added item {} ({})", added.id, added.title);
                true
            })
            .await?;
        }
        RunSheetCommand::Move {
            run_sheet_id,
            item_id,
            index,
        } => {
            edit_run_sheet(ctx, run_sheet_id, |document| {
                document.move_to(&ItemId::new(item_id), index)
            })
            .await?;
        }
        RunSheetCommand::Remove {
            run_sheet_id,
            item_id,
        } => {
            edit_run_sheet(ctx, run_sheet_id, |document| {
                document.remove(&ItemId::new(item_id)).is_some()
            })
            .await?;
        }
        RunSheetCommand::Update {
            run_sheet_id,
            item_id,
            patch,
        } => {
            edit_run_sheet(ctx, run_sheet_id, |document| {
                document.update(&ItemId::new(item_id), patch.into())
            })
            .await?;
        }
        RunSheetCommand::Status {
            run_sheet_id,
            status,
        } => {
            api(team_api::set_run_sheet_status(ctx, directory, RunSheetId(run_sheet_id), status)
                .await)?;
            println!("run sheet {run_sheet_id} is now {status}");
        }
        RunSheetCommand::Export { run_sheet_id, out } => {
            let json = api(team_api::export_run_sheet(ctx, RunSheetId(run_sheet_id)).await)?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    println!("exported run sheet {run_sheet_id} to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        RunSheetCommand::Delete { run_sheet_id } => {
            api(team_api::delete_run_sheet(ctx, directory, RunSheetId(run_sheet_id)).await)?;
            println!("deleted run sheet {run_sheet_id}");
        }
        RunSheetCommand::Templates => {
            for template in RunSheetTemplate::ALL {
                let minutes: u64 = template
                    .items()
                    .iter()
                    .map(|item| u64::from(item.duration_minutes))
                    .sum();
                println!(
                    "{:<15} {:>2} items  {}",
                    template.as_str(),
                    template.items().len(),
                    format_minutes(minutes)
                );
            }
        }
    }
    Ok(())
}

/// Opens a sheet, applies one edit and saves only if the edit changed something.
async fn edit_run_sheet(
    ctx: &ApiContext,
    run_sheet_id: i64,
    edit: impl FnOnce(&mut RunSheetDocument) -> bool,
) -> Result<()> {
    let mut document = api(team_api::open_run_sheet(ctx, RunSheetId(run_sheet_id)).await)?;
    let changed = edit(&mut document);
    if !changed || !document.is_dirty() {
        println!("nothing changed");
        return Ok(());
    }
    api(team_api::save_run_sheet(ctx, &mut document).await)?;
    print_document(&document);
    Ok(())
}

fn print_document(document: &RunSheetDocument) {
    let meta = document.meta();
    println!(
        "{} [{}] {} {} ({})",
        meta.title,
        meta.status,
        meta.service_date,
        meta.service_time.format("%H:%M"),
        meta.category
    );
    for (position, entry) in document.items().timeline().iter().enumerate() {
        let item = entry.item;
        println!(
            "{:>3}. +{:<4} {:<12} {:<32} {:>3} min  id={}",
            position + 1,
            entry.start_minute,
            item.kind,
            item.title,
            item.duration_minutes,
            item.id
        );
    }
    println!("total {}", format_minutes(document.total_duration()));
}

fn format_minutes(minutes: u64) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    if hours == 0 {
        format!("{rest}m")
    } else {
        format!("{hours}h {rest}m")
    }
}

async fn user_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: UserCommand,
) -> Result<()> {
    match command {
        UserCommand::Add {
            email,
            name,
            role,
            phone,
        } => {
            let member = team_api::NewMember {
                email,
                name,
                phone,
                role,
            };
            let user = api(team_api::add_member(ctx, directory, member).await)?;
            println!("user_id={} {} <{}> {}", user.id, user.name, user.email, user.role);
        }
        UserCommand::List { search, role } => {
            let filter = team_api::TeamFilter { search, role };
            for member in api(team_api::list_members(directory, &filter).await)? {
                println!(
                    "{:>4}  {:<10}  {:<24}  {}",
                    member.id, member.role, member.name, member.email
                );
            }
        }
    }
    Ok(())
}

async fn service_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: ServiceCommand,
) -> Result<()> {
    match command {
        ServiceCommand::Create {
            name,
            date,
            time,
            service_type,
            location,
            description,
            roles,
        } => {
            let new = NewService {
                name,
                description,
                service_date: date,
                service_time: time,
                location,
                service_type,
            };
            let scheduled = api(team_api::create_service(ctx, directory, new, &roles).await)?;
            println!("created service_id={}", scheduled.service.id);
            for assignment in &scheduled.assignments {
                println!("  assignment_id={} {}", assignment.id, assignment.role);
            }
        }
        ServiceCommand::List { from } => {
            let from = from.unwrap_or_else(|| Local::now().date_naive());
            for scheduled in api(team_api::upcoming_services(ctx, from).await)? {
                let service = &scheduled.service;
                let (filled, total) = scheduled.staffing();
                println!(
                    "{:>4}  {} {}  {:<24}  {filled}/{total} roles filled",
                    service.id,
                    service.service_date,
                    service.service_time.format("%H:%M"),
                    service.name
                );
                for assignment in &scheduled.assignments {
                    let who = assignment
                        .user_id
                        .map_or_else(|| "unfilled".to_string(), |id| format!("user {id}"));
                    println!(
                        "        #{} {:<16} {:<10} {}",
                        assignment.id, assignment.role, assignment.status, who
                    );
                }
            }
        }
        ServiceCommand::Cancel { service_id } => {
            api(team_api::cancel_service(ctx, directory, ServiceId(service_id)).await)?;
            println!("service {service_id} cancelled");
        }
    }
    Ok(())
}

async fn media_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: MediaCommand,
) -> Result<()> {
    match command {
        MediaCommand::Add {
            name,
            file_type,
            url,
            size,
            category,
            tags,
        } => {
            let new = NewMediaFile {
                name,
                file_type,
                file_size: size,
                file_url: url,
                category,
                tags,
                ..NewMediaFile::default()
            };
            let file = api(team_api::register_media(ctx, directory, new).await)?;
            println!("media_id={} {}", file.id, file.name);
        }
        MediaCommand::Search {
            search,
            category,
            file_type,
        } => {
            let filter = team_api::MediaFilter {
                search,
                category: category.map_or(Choice::All, Choice::Only),
                file_type: file_type.map_or(Choice::All, Choice::Only),
            };
            for file in api(team_api::search_media(ctx, &filter).await)? {
                println!(
                    "{:>4}  {:<8}  {:<32}  [{}]  {}",
                    file.id,
                    file.file_type,
                    file.name,
                    file.tags.join(", "),
                    file.file_url
                );
            }
        }
        MediaCommand::Delete { media_id } => {
            api(team_api::delete_media(ctx, directory, MediaFileId(media_id)).await)?;
            println!("deleted media {media_id}");
        }
    }
    Ok(())
}

async fn announcement_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: AnnouncementCommand,
) -> Result<()> {
    match command {
        AnnouncementCommand::Create {
            title,
            content,
            priority,
            category,
            tags,
            pinned,
            expires,
        } => {
            let new = NewAnnouncement {
                title,
                content,
                priority,
                category,
                tags,
                is_pinned: pinned,
                expires_at: expires,
            };
            let announcement = api(team_api::create_announcement(ctx, directory, new).await)?;
            println!("drafted announcement_id={}", announcement.id);
        }
        AnnouncementCommand::Publish { announcement_id } => {
            let announcement = api(team_api::publish_announcement(
                ctx,
                directory,
                AnnouncementId(announcement_id),
            )
            .await)?;
            println!("published announcement {}", announcement.id);
        }
        AnnouncementCommand::Pin {
            announcement_id,
            unpin,
        } => {
            api(team_api::pin_announcement(
                ctx,
                directory,
                AnnouncementId(announcement_id),
                !unpin,
            )
            .await)?;
            println!(
                "announcement {announcement_id} {}",
                if unpin { "unpinned" } else { "pinned" }
            );
        }
        AnnouncementCommand::Feed {
            search,
            priority,
            category,
        } => {
            let filter = team_api::AnnouncementFilter {
                search,
                priority,
                category: category.map_or(Choice::All, Choice::Only),
            };
            for announcement in api(team_api::announcement_feed(ctx, &filter, Utc::now()).await)? {
                let pin = if announcement.is_pinned { "*" } else { " " };
                println!(
                    "{pin}{:>4}  {:<7}  {}\n       {}",
                    announcement.id, announcement.priority, announcement.title, announcement.content
                );
            }
        }
    }
    Ok(())
}

async fn applications_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: ApplicationsCommand,
) -> Result<()> {
    match command {
        ApplicationsCommand::List { status } => {
            for application in api(team_api::list_applications(ctx, directory, status).await)? {
                println!(
                    "{:>4}  {:<12}  {:<24}  {:<16}  {}",
                    application.id,
                    application.status,
                    application.full_name,
                    application.phone_number,
                    application.technical_skills
                );
            }
        }
        ApplicationsCommand::Review {
            application_id,
            status,
        } => {
            let application = api(team_api::review_application(
                ctx,
                directory,
                ApplicationId(application_id),
                status,
            )
            .await)?;
            println!("application {} is now {}", application.id, application.status);
        }
    }
    Ok(())
}

async fn notifications_command(
    ctx: &ApiContext,
    directory: &StorageDirectory,
    command: NotificationsCommand,
) -> Result<()> {
    match command {
        NotificationsCommand::List { tab } => {
            let unread = api(team_api::unread_count(ctx, directory).await)?;
            println!("{unread} unread");
            for notification in api(team_api::list_notifications(ctx, directory, &tab).await)? {
                let marker = if notification.is_read { " " } else { "•" };
                println!(
                    "{marker}{:>4}  {:<12}  {}: {}",
                    notification.id, notification.kind, notification.title, notification.message
                );
            }
        }
        NotificationsCommand::Read { notification_id } => {
            api(team_api::mark_read(ctx, directory, NotificationId(notification_id)).await)?;
            println!("notification {notification_id} read");
        }
        NotificationsCommand::ReadAll => {
            let changed = api(team_api::mark_all_read(ctx, directory).await)?;
            println!("marked {changed} notifications read");
        }
    }
    Ok(())
}

fn api<T>(result: Result<T, ApiError>) -> Result<T> {
    result.map_err(|error| ApiException::from(error).into())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
