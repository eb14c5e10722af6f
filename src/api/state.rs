//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::{AuthService, TokenService};
use crate::infrastructure::user::UserService;

/// Application state shared by all handlers
///
/// Everything in here is immutable after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Create new application state from the user service and token service
    pub fn new(user_service: Arc<UserService>, token_service: Arc<dyn TokenService>) -> Self {
        let auth_service = Arc::new(AuthService::new(user_service.clone(), token_service));

        Self {
            user_service,
            auth_service,
        }
    }
}
