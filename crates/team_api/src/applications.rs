use shared::{
    domain::{ApplicationId, ApplicationStatus, Choice, UserId},
    error::ApiError,
    records::{Application, ApplicationForm, NewApplication},
};
use tracing::info;

use crate::{
    directory::{require_lead, UserDirectory},
    internal, ApiContext,
};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// Trims every field of the form and rejects it if any is left empty.
pub fn validate_application(
    form: &ApplicationForm,
    submitted_by: Option<UserId>,
) -> Result<NewApplication, ApiError> {
    let fields = [
        form.full_name.trim(),
        form.phone_number.trim(),
        form.occupation.trim(),
        form.technical_skills.trim(),
    ];
    if fields.iter().any(|field| field.is_empty()) {
        return Err(ApiError::validation(ALL_FIELDS_REQUIRED));
    }
    let [full_name, phone_number, occupation, technical_skills] = fields.map(str::to_string);
    Ok(NewApplication {
        full_name,
        phone_number,
        occupation,
        technical_skills,
        user_id: submitted_by,
    })
}

/// Public entry point; anonymous submitters are allowed.
pub async fn submit_application(
    ctx: &ApiContext,
    form: &ApplicationForm,
    submitted_by: Option<UserId>,
) -> Result<Application, ApiError> {
    let new = validate_application(form, submitted_by)?;
    let application = ctx
        .storage
        .insert_application(&new)
        .await
        .map_err(internal)?;
    info!(application_id = %application.id, "volunteer application received");
    Ok(application)
}

/// Applications newest first. The CLI defaults the filter to pending.
pub async fn list_applications(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    status: Choice<ApplicationStatus>,
) -> Result<Vec<Application>, ApiError> {
    require_lead(directory).await?;
    let status = match status {
        Choice::All => None,
        Choice::Only(status) => Some(status),
    };
    ctx.storage
        .list_applications(status)
        .await
        .map_err(internal)
}

pub async fn review_application(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    application_id: ApplicationId,
    status: ApplicationStatus,
) -> Result<Application, ApiError> {
    let reviewer = require_lead(directory).await?;
    let updated = ctx
        .storage
        .set_application_status(application_id, status)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!("application {application_id}")));
    }
    info!(%application_id, %status, reviewer = %reviewer.id, "application reviewed");
    ctx.storage
        .get_application(application_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("application {application_id}")))
}
