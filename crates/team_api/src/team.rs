use shared::{
    domain::{matches_search, Choice, UserRole},
    error::ApiError,
    records::{NewUser, User},
};
use tracing::info;

use crate::{
    directory::{require_lead, UserDirectory},
    internal, required, ApiContext,
};

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    /// Matched against name and email.
    pub search: String,
    pub role: Choice<UserRole>,
}

pub async fn list_members(
    directory: &dyn UserDirectory,
    filter: &TeamFilter,
) -> Result<Vec<User>, ApiError> {
    let members = directory.list().await?;
    Ok(members
        .into_iter()
        .filter(|member| {
            matches_search(&filter.search, &[member.name.as_str(), member.email.as_str()])
                && filter.role.matches(&member.role)
        })
        .collect())
}

/// A roster entry to add or refresh. Absent fields keep what is stored.
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

/// Adds a member, or refreshes the one with the same email.
///
/// Leads manage the roster. The very first member may be added by anyone and
/// becomes an admin unless a role is given.
pub async fn add_member(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    member: NewMember,
) -> Result<User, ApiError> {
    let email = required(&member.email, "email")?;
    let name = required(&member.name, "name")?;

    let roster_is_empty = ctx.storage.list_users().await.map_err(internal)?.is_empty();
    let default_role = if roster_is_empty {
        UserRole::Admin
    } else {
        require_lead(directory).await?;
        UserRole::Volunteer
    };

    let existing = ctx
        .storage
        .find_user_by_email(&email)
        .await
        .map_err(internal)?;
    let (role, phone) = match existing {
        Some(stored) => (
            member.role.unwrap_or(stored.role),
            member.phone.or(stored.phone),
        ),
        None => (member.role.unwrap_or(default_role), member.phone),
    };

    let user = ctx
        .storage
        .upsert_user(&NewUser {
            email,
            name,
            phone,
            role,
        })
        .await
        .map_err(internal)?;
    info!(user_id = %user.id, role = %user.role, bootstrap = roster_is_empty, "member saved");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shared::{domain::UserId, error::ErrorCode};

    use super::*;
    use crate::{
        test_support::{context, signed_in, user},
        StaticDirectory, StorageDirectory,
    };

    fn member(id: i64, name: &str, role: UserRole) -> User {
        User {
            id: UserId(id),
            email: format!("{}@church.test", name.to_lowercase()),
            name: name.into(),
            phone: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        }
    }

    fn roster() -> StaticDirectory {
        StaticDirectory::new(
            vec![
                member(1, "Pastor", UserRole::Admin),
                member(2, "Miriam", UserRole::MediaLead),
                member(3, "Sam", UserRole::Volunteer),
                member(4, "Samuel", UserRole::Volunteer),
            ],
            None,
        )
    }

    #[tokio::test]
    async fn search_covers_name_and_email() {
        let found = list_members(
            &roster(),
            &TeamFilter {
                search: "SAM".into(),
                ..TeamFilter::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn role_filter_narrows_the_roster() {
        let leads = list_members(
            &roster(),
            &TeamFilter {
                role: Choice::Only(UserRole::MediaLead),
                ..TeamFilter::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Miriam");

        let everyone = list_members(&roster(), &TeamFilter::default()).await.expect("list");
        assert_eq!(everyone.len(), 4);
    }

    fn entry(email: &str, role: Option<UserRole>) -> NewMember {
        NewMember {
            email: email.into(),
            name: "Ana".into(),
            phone: None,
            role,
        }
    }

    #[tokio::test]
    async fn first_member_bootstraps_as_admin() {
        let ctx = context().await;
        let anonymous = StorageDirectory::new(ctx.storage.clone(), None);

        let first = add_member(&ctx, &anonymous, entry("pastor@church.test", None))
            .await
            .expect("bootstrap");
        assert_eq!(first.role, UserRole::Admin);

        let err = add_member(&ctx, &anonymous, entry("ana@church.test", None))
            .await
            .expect_err("roster exists");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn only_leads_add_members_and_new_ones_default_to_volunteer() {
        let ctx = context().await;
        let lead = user(&ctx, "lead@church.test", UserRole::MediaLead).await;
        let volunteer = user(&ctx, "vol@church.test", UserRole::Volunteer).await;

        let err = add_member(&ctx, &signed_in(&ctx, &volunteer), entry("ana@church.test", None))
            .await
            .expect_err("volunteer");
        assert_eq!(err.code, ErrorCode::Forbidden);

        let ana = add_member(&ctx, &signed_in(&ctx, &lead), entry(" ana@church.test ", None))
            .await
            .expect("add");
        assert_eq!(ana.role, UserRole::Volunteer);
        assert_eq!(ana.email, "ana@church.test");
    }

    #[tokio::test]
    async fn re_adding_without_a_role_keeps_the_stored_one() {
        let ctx = context().await;
        let admin = user(&ctx, "pastor@church.test", UserRole::Admin).await;
        let directory = signed_in(&ctx, &admin);
        let mut again = entry("pastor@church.test", None);
        again.name = "Pastor John".into();
        again.phone = Some("555-0100".into());
        add_member(&ctx, &directory, again).await.expect("refresh");

        let refreshed = add_member(&ctx, &directory, entry("pastor@church.test", None))
            .await
            .expect("refresh");
        assert_eq!(refreshed.id, admin.id);
        assert_eq!(refreshed.role, UserRole::Admin);
        assert_eq!(refreshed.phone.as_deref(), Some("555-0100"));

        let demoted = add_member(
            &ctx,
            &directory,
            entry("pastor@church.test", Some(UserRole::MediaLead)),
        )
        .await
        .expect("explicit role");
        assert_eq!(demoted.role, UserRole::MediaLead);
    }
}
