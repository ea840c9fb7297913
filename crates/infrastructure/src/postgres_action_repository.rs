use async_trait::async_trait;
use chrono::{DateTime, Utc};
use porta_application::{ActionConfigurationRepository, ContactRoleRepository};
use porta_core::{ActionConfigurationId, AppError, AppResult, ContactId, WebRoleId};
use porta_domain::{ActionConfiguration, ActionConfigurationInput, ActionType};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed repository for action configurations and role membership.
#[derive(Clone)]
pub struct PostgresActionRepository {
    pool: PgPool,
}

impl PostgresActionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActionConfigurationRow {
    configuration_id: Uuid,
    operation: String,
    action_type: String,
    custom_api: Option<String>,
    contact_id_parameter: Option<String>,
    contact_reference_parameter: Option<String>,
    restricted_to_authenticated: bool,
    restricted_to_web_roles: bool,
    is_active: bool,
    created_on: DateTime<Utc>,
    allowed_web_roles: Vec<Uuid>,
}

#[derive(Debug, FromRow)]
struct WebRoleRow {
    web_role_id: Uuid,
}

#[async_trait]
impl ActionConfigurationRepository for PostgresActionRepository {
    async fn list_active_configurations(
        &self,
        operation: &str,
    ) -> AppResult<Vec<ActionConfiguration>> {
        let rows = sqlx::query_as::<_, ActionConfigurationRow>(
            r#"
            SELECT
                configurations.configuration_id,
                configurations.operation,
                configurations.action_type,
                configurations.custom_api,
                configurations.contact_id_parameter,
                configurations.contact_reference_parameter,
                configurations.restricted_to_authenticated,
                configurations.restricted_to_web_roles,
                configurations.is_active,
                configurations.created_on,
                COALESCE(
                    ARRAY_AGG(roles.web_role_id) FILTER (WHERE roles.web_role_id IS NOT NULL),
                    '{}'
                ) AS allowed_web_roles
            FROM portal_action_configurations AS configurations
            LEFT JOIN portal_action_configuration_web_roles AS roles
                ON roles.configuration_id = configurations.configuration_id
            WHERE configurations.operation = $1
                AND configurations.is_active
            GROUP BY configurations.configuration_id
            ORDER BY configurations.created_on, configurations.configuration_id
            "#,
        )
        .bind(operation)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load action configurations for operation '{operation}': {error}"
            ))
        })?;

        rows.into_iter().map(configuration_from_row).collect()
    }
}

#[async_trait]
impl ContactRoleRepository for PostgresActionRepository {
    async fn list_web_roles_for_contact(&self, contact_id: ContactId) -> AppResult<Vec<WebRoleId>> {
        let rows = sqlx::query_as::<_, WebRoleRow>(
            r#"
            SELECT web_role_id
            FROM portal_contact_web_roles
            WHERE contact_id = $1
            ORDER BY web_role_id
            "#,
        )
        .bind(contact_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load web roles for contact '{contact_id}': {error}"
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| WebRoleId::from_uuid(row.web_role_id))
            .collect())
    }
}

fn configuration_from_row(row: ActionConfigurationRow) -> AppResult<ActionConfiguration> {
    let configuration_id = row.configuration_id;
    ActionConfiguration::new(ActionConfigurationInput {
        configuration_id: ActionConfigurationId::from_uuid(row.configuration_id),
        operation: row.operation,
        action_type: ActionType::parse(row.action_type.as_str()),
        custom_api: row.custom_api,
        contact_id_parameter: row.contact_id_parameter,
        contact_reference_parameter: row.contact_reference_parameter,
        restricted_to_authenticated: row.restricted_to_authenticated,
        restricted_to_web_roles: row.restricted_to_web_roles,
        allowed_web_roles: row
            .allowed_web_roles
            .into_iter()
            .map(WebRoleId::from_uuid)
            .collect(),
        is_active: row.is_active,
        created_on: row.created_on,
    })
    .map_err(|error| {
        AppError::Internal(format!(
            "stored action configuration '{configuration_id}' is invalid: {error}"
        ))
    })
}
