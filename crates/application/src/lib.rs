//! Application services and ports.

#![forbid(unsafe_code)]

mod action_authorization_gate;
mod action_configuration_service;
mod action_dispatch_service;
mod action_ports;
mod value_conversion_service;

pub use action_authorization_gate::ActionAuthorizationGate;
pub use action_configuration_service::ActionConfigurationService;
pub use action_dispatch_service::ActionDispatchService;
pub use action_ports::{
    ActionConfigurationRepository, ContactRoleRepository, CustomApiExecutor, CustomApiRequest,
    CustomApiResponse,
};
pub use value_conversion_service::ValueConversionService;
