use std::sync::Arc;

use porta_core::{AppError, AppResult};
use porta_domain::{ActionConfiguration, CallerContext};
use tracing::{debug, warn};

use crate::ContactRoleRepository;


/// Decides whether a caller may invoke a configured action.
#[derive(Clone)]
pub struct ActionAuthorizationGate {
    role_repository: Arc<dyn ContactRoleRepository>,
}

impl ActionAuthorizationGate {
    /// Creates a gate over a contact role repository.
    #[must_use]
    pub fn new(role_repository: Arc<dyn ContactRoleRepository>) -> Self {
        Self { role_repository }
    }

    /// Allows the call or fails with [`AppError::Unauthorized`].
    ///
    /// Restricted configurations reject anonymous callers. Role-restricted
    /// configurations additionally require the caller's contact to hold at
    /// least one allowed role.
    pub async fn authorize(
        &self,
        caller: &CallerContext,
        configuration: &ActionConfiguration,
    ) -> AppResult<()> {
        let operation = configuration.operation().as_str();
        let restricted =
            configuration.restricted_to_authenticated() || configuration.restricted_to_web_roles();

        let Some(contact_id) = caller.contact_id() else {
            if restricted {
                warn!(operation = operation, "anonymous caller rejected");
                return Err(AppError::Unauthorized(format!(
                    "anonymous caller is not allowed to invoke '{operation}'"
                )));
            }

            return Ok(());
        };

        if !configuration.restricted_to_web_roles() {
            return Ok(());
        }

        let caller_roles = self
            .role_repository
            .list_web_roles_for_contact(contact_id)
            .await?;
        debug!(
            operation = operation,
            contact_id = %contact_id,
            allowed_roles = configuration.allowed_web_roles().len(),
            caller_roles = caller_roles.len(),
            "checking web role overlap"
        );

        if caller_roles
            .iter()
            .any(|role| configuration.allowed_web_roles().contains(role))
        {
            return Ok(());
        }

        warn!(
            operation = operation,
            contact_id = %contact_id,
            "caller holds no matching web role"
        );
        Err(AppError::Unauthorized(format!(
            "no matching role for '{operation}'"
        )))
    }
}
