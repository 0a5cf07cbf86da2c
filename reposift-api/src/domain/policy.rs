use strum::Display;

use super::{Role, User};

/// Everything a mutation handler knows about the caller. Built once from
/// the session user and handed to [`authorize`]; handlers never compare
/// role strings themselves.
#[derive(Debug, Clone)]
pub struct AuthzContext {
    pub user_id: i32,
    pub role: Role,
}

impl From<&User> for AuthzContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    ContributeRepository,
    RefreshRepository,
    SuggestLabel,
    SubmitReport,
    EditProfile,
    ModerateRepository,
    DeleteRepository,
    DeleteLabel,
    ReviewReports,
}

impl Action {
    fn requires_admin(self) -> bool {
        matches!(
            self,
            Action::ModerateRepository
                | Action::DeleteRepository
                | Action::DeleteLabel
                | Action::ReviewReports
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Not allowed to {0}")]
pub struct PolicyError(Action);

/// The single policy check consulted by every mutation handler.
pub fn authorize(ctx: &AuthzContext, action: Action) -> Result<(), PolicyError> {
    match ctx.role {
        Role::Admin => Ok(()),
        Role::User if !action.requires_admin() => Ok(()),
        Role::User => Err(PolicyError(action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> AuthzContext {
        AuthzContext { user_id: 1, role }
    }

    #[test]
    fn admin_is_allowed_everything() {
        for action in [
            Action::ContributeRepository,
            Action::ModerateRepository,
            Action::DeleteRepository,
            Action::DeleteLabel,
            Action::ReviewReports,
        ] {
            assert!(authorize(&ctx(Role::Admin), action).is_ok());
        }
    }

    #[test]
    fn user_is_allowed_contribution_actions() {
        for action in [
            Action::ContributeRepository,
            Action::RefreshRepository,
            Action::SuggestLabel,
            Action::SubmitReport,
            Action::EditProfile,
        ] {
            assert!(authorize(&ctx(Role::User), action).is_ok());
        }
    }

    #[test]
    fn user_is_denied_moderation_actions() {
        for action in [
            Action::ModerateRepository,
            Action::DeleteRepository,
            Action::DeleteLabel,
            Action::ReviewReports,
        ] {
            let err = authorize(&ctx(Role::User), action).unwrap_err();
            assert!(err.to_string().contains("Not allowed"));
        }
    }
}
