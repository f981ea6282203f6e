use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    domain::{AssignmentId, AssignmentStatus, ServiceId, ServiceStatus, UserId},
    error::ApiError,
    records::{NewService, Service, ServiceAssignment},
};
use tracing::info;

use crate::{
    directory::{require_current, require_lead, UserDirectory},
    internal,
    notifications::notify,
    required, ApiContext,
};

/// A service with its production roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledService {
    pub service: Service,
    pub assignments: Vec<ServiceAssignment>,
}

impl ScheduledService {
    /// `(filled, total)` role counts.
    pub fn staffing(&self) -> (usize, usize) {
        let filled = self
            .assignments
            .iter()
            .filter(|assignment| assignment.is_filled())
            .count();
        (filled, self.assignments.len())
    }
}

pub async fn create_service(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    mut new: NewService,
    roles: &[String],
) -> Result<ScheduledService, ApiError> {
    let lead = require_lead(directory).await?;
    new.name = required(&new.name, "name")?;

    let roles: Vec<String> = roles
        .iter()
        .map(|role| role.trim())
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect();
    let (service, assignments) = ctx
        .storage
        .create_service(&new, lead.id, &roles)
        .await
        .map_err(internal)?;
    info!(service_id = %service.id, roles = assignments.len(), "service scheduled");
    Ok(ScheduledService {
        service,
        assignments,
    })
}

pub async fn get_service(
    ctx: &ApiContext,
    service_id: ServiceId,
) -> Result<ScheduledService, ApiError> {
    let service = ctx
        .storage
        .get_service(service_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("service {service_id}")))?;
    let assignments = ctx
        .storage
        .list_assignments_for_service(service_id)
        .await
        .map_err(internal)?;
    Ok(ScheduledService {
        service,
        assignments,
    })
}

/// Services on or after `from`, earliest first, cancelled ones left out.
pub async fn upcoming_services(
    ctx: &ApiContext,
    from: NaiveDate,
) -> Result<Vec<ScheduledService>, ApiError> {
    let services = ctx
        .storage
        .list_services_from(from)
        .await
        .map_err(internal)?;
    let mut scheduled = Vec::new();
    for service in services {
        if service.status == ServiceStatus::Cancelled {
            continue;
        }
        let assignments = ctx
            .storage
            .list_assignments_for_service(service.id)
            .await
            .map_err(internal)?;
        scheduled.push(ScheduledService {
            service,
            assignments,
        });
    }
    Ok(scheduled)
}

/// Puts `user_id` on a role, resets the response to pending and tells them.
pub async fn assign_role(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    assignment_id: AssignmentId,
    user_id: UserId,
) -> Result<ServiceAssignment, ApiError> {
    require_lead(directory).await?;
    let assignment = load_assignment(ctx, assignment_id).await?;
    let assignee = ctx
        .storage
        .get_user(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id}")))?;
    let service = ctx
        .storage
        .get_service(assignment.service_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("service {}", assignment.service_id)))?;

    ctx.storage
        .assign_user(assignment_id, assignee.id)
        .await
        .map_err(internal)?;
    notify(
        ctx,
        assignee.id,
        "assignment",
        format!("New assignment: {}", assignment.role),
        format!(
            "You have been scheduled for {} on {} at {}",
            service.name,
            service.service_date.format("%Y-%m-%d"),
            service.service_time.format("%H:%M")
        ),
        Some(format!("/schedule/{}", service.id)),
    )
    .await?;
    info!(%assignment_id, user_id = %assignee.id, role = %assignment.role, "role assigned");

    load_assignment(ctx, assignment_id).await
}

/// The assignee confirms or declines. Anyone else is refused.
pub async fn respond_to_assignment(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    assignment_id: AssignmentId,
    accept: bool,
    notes: Option<&str>,
) -> Result<ServiceAssignment, ApiError> {
    let user = require_current(directory).await?;
    let assignment = load_assignment(ctx, assignment_id).await?;
    if assignment.user_id != Some(user.id) {
        return Err(ApiError::forbidden(
            "only the assigned volunteer can respond",
        ));
    }

    let status = if accept {
        AssignmentStatus::Confirmed
    } else {
        AssignmentStatus::Declined
    };
    let notes = notes.map(str::trim).filter(|notes| !notes.is_empty());
    ctx.storage
        .set_assignment_status(assignment_id, status, notes)
        .await
        .map_err(internal)?;
    info!(%assignment_id, %status, "assignment answered");

    load_assignment(ctx, assignment_id).await
}

pub async fn cancel_service(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    service_id: ServiceId,
) -> Result<(), ApiError> {
    require_lead(directory).await?;
    let updated = ctx
        .storage
        .set_service_status(service_id, ServiceStatus::Cancelled)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!("service {service_id}")));
    }
    Ok(())
}

async fn load_assignment(
    ctx: &ApiContext,
    assignment_id: AssignmentId,
) -> Result<ServiceAssignment, ApiError> {
    ctx.storage
        .get_assignment(assignment_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("assignment {assignment_id}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use shared::{domain::UserRole, error::ErrorCode};

    use super::*;
    use crate::{
        notifications::{list_notifications, NotificationTab},
        test_support::{context, signed_in, user},
    };

    fn service(name: &str, day: u32, hour: u32) -> NewService {
        NewService {
            name: name.into(),
            description: None,
            service_date: NaiveDate::from_ymd_opt(2024, 3, day).expect("date"),
            service_time: NaiveTime::from_hms_opt(hour, 0, 0).expect("time"),
            location: Some("Main Hall".into()),
            service_type: "sunday".into(),
        }
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn upcoming_services_are_ordered_and_skip_cancelled() {
        let ctx = context().await;
        let lead = user(&ctx, "lead@church.test", UserRole::MediaLead).await;
        let directory = signed_in(&ctx, &lead);

        let late = create_service(&ctx, &directory, service("Evening", 10, 18), &[])
            .await
            .expect("create");
        let early = create_service(&ctx, &directory, service("Morning", 10, 9), &[])
            .await
            .expect("create");
        let cancelled = create_service(&ctx, &directory, service("Midweek", 6, 19), &[])
            .await
            .expect("create");
        create_service(&ctx, &directory, service("Past", 1, 10), &[])
            .await
            .expect("create");
        cancel_service(&ctx, &directory, cancelled.service.id)
            .await
            .expect("cancel");

        let from = NaiveDate::from_ymd_opt(2024, 3, 3).expect("date");
        let upcoming = upcoming_services(&ctx, from).await.expect("upcoming");
        let ids: Vec<_> = upcoming.iter().map(|s| s.service.id).collect();
        assert_eq!(ids, vec![early.service.id, late.service.id]);
    }

    #[tokio::test]
    async fn assigning_notifies_and_only_the_assignee_may_respond() {
        let ctx = context().await;
        let lead = user(&ctx, "lead@church.test", UserRole::Admin).await;
        let ana = user(&ctx, "ana@church.test", UserRole::Volunteer).await;
        let ben = user(&ctx, "ben@church.test", UserRole::Volunteer).await;
        let lead_dir = signed_in(&ctx, &lead);

        let scheduled = create_service(
            &ctx,
            &lead_dir,
            service("Sunday", 10, 10),
            &roles(&["Camera 1", "  ", "Live Stream"]),
        )
        .await
        .expect("create");
        assert_eq!(scheduled.staffing(), (0, 2));

        let camera = scheduled.assignments[0].id;
        let assigned = assign_role(&ctx, &lead_dir, camera, ana.id)
            .await
            .expect("assign");
        assert_eq!(assigned.user_id, Some(ana.id));
        assert_eq!(assigned.status, AssignmentStatus::Pending);

        let inbox = list_notifications(&ctx, &signed_in(&ctx, &ana), &NotificationTab::Unread)
            .await
            .expect("inbox");
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, "assignment");

        let err = respond_to_assignment(&ctx, &signed_in(&ctx, &ben), camera, true, None)
            .await
            .expect_err("not assigned");
        assert_eq!(err.code, ErrorCode::Forbidden);

        let answered = respond_to_assignment(
            &ctx,
            &signed_in(&ctx, &ana),
            camera,
            false,
            Some(" travelling "),
        )
        .await
        .expect("respond");
        assert_eq!(answered.status, AssignmentStatus::Declined);
        assert_eq!(answered.notes.as_deref(), Some("travelling"));

        let reloaded = get_service(&ctx, scheduled.service.id).await.expect("get");
        assert_eq!(reloaded.staffing(), (1, 2));
    }

    #[tokio::test]
    async fn volunteers_cannot_schedule() {
        let ctx = context().await;
        let volunteer = user(&ctx, "vol@church.test", UserRole::Volunteer).await;
        let err = create_service(&ctx, &signed_in(&ctx, &volunteer), service("Sunday", 10, 10), &[])
            .await
            .expect_err("volunteer");
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
