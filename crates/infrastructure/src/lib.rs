//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_custom_api_executor;
mod in_memory_action_repository;
mod in_process_custom_api_executor;
mod postgres_action_repository;

pub use http_custom_api_executor::HttpCustomApiExecutor;
pub use in_memory_action_repository::InMemoryActionRepository;
pub use in_process_custom_api_executor::{CustomApiHandler, InProcessCustomApiExecutor};
pub use postgres_action_repository::PostgresActionRepository;
