use axum::http::HeaderName;
use porta_application::ActionDispatchService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub action_dispatch_service: ActionDispatchService,
    pub contact_header: HeaderName,
    pub frontend_url: String,
}
