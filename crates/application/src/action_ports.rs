mod custom_api;
mod repository;

pub use custom_api::{CustomApiExecutor, CustomApiRequest, CustomApiResponse};
pub use repository::{ActionConfigurationRepository, ContactRoleRepository};
