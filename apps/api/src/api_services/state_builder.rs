use std::sync::Arc;
use std::time::Duration;

use porta_application::{
    ActionAuthorizationGate, ActionConfigurationRepository, ActionConfigurationService,
    ActionDispatchService, ContactRoleRepository, CustomApiExecutor,
};
use porta_core::AppError;
use porta_infrastructure::{
    HttpCustomApiExecutor, InMemoryActionRepository, PostgresActionRepository,
};
use tracing::info;

use crate::api_config::{ActionStoreConfig, ApiConfig, CustomApiConfig};
use crate::dev_seed;
use crate::sample_custom_apis::build_sample_executor;
use crate::state::AppState;

use super::database::connect_and_migrate;

type ActionStore = (
    Arc<dyn ActionConfigurationRepository>,
    Arc<dyn ContactRoleRepository>,
);

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let (configuration_repository, role_repository) =
        build_action_store(&config.action_store).await?;
    let executor = build_custom_api_executor(&config.custom_api)?;

    let action_dispatch_service = ActionDispatchService::new(
        ActionConfigurationService::new(configuration_repository),
        ActionAuthorizationGate::new(role_repository),
        executor,
    );

    Ok(AppState {
        action_dispatch_service,
        contact_header: config.contact_header.clone(),
        frontend_url: config.frontend_url.clone(),
    })
}

async fn build_action_store(config: &ActionStoreConfig) -> Result<ActionStore, AppError> {
    match config {
        ActionStoreConfig::Memory => {
            let repository = Arc::new(InMemoryActionRepository::new());
            dev_seed::seed_sample_actions(&repository).await?;
            info!("using in-memory action store");
            Ok(split_store(repository))
        }
        ActionStoreConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            let repository = Arc::new(PostgresActionRepository::new(pool));
            info!("using postgres action store");
            Ok(split_store(repository))
        }
    }
}

fn split_store<R>(repository: Arc<R>) -> ActionStore
where
    R: ActionConfigurationRepository + ContactRoleRepository + 'static,
{
    let configuration_repository: Arc<dyn ActionConfigurationRepository> = repository.clone();
    let role_repository: Arc<dyn ContactRoleRepository> = repository;
    (configuration_repository, role_repository)
}

fn build_custom_api_executor(
    config: &CustomApiConfig,
) -> Result<Arc<dyn CustomApiExecutor>, AppError> {
    let Some(base_url) = config.base_url.as_deref() else {
        info!("custom APIs run in-process with the sample handlers");
        return Ok(Arc::new(build_sample_executor(
            dev_seed::sample_contact_directory()?,
        )));
    };

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    info!(base_url = base_url, "custom APIs are invoked over HTTP");
    Ok(Arc::new(HttpCustomApiExecutor::new(
        http_client,
        base_url,
        config.max_attempts,
        config.retry_backoff_ms,
    )))
}
