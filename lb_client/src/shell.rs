//! Shell controller.
//!
//! Owns the navigation-derived state at the top of the client: the
//! current route path and whether it is an authentication route. Auth
//! routes suppress the authenticated chrome (navigation, search), and a
//! completed navigation from an auth route to a non-auth route refreshes
//! the session, which is how a fresh login propagates into the shell.

use std::sync::Arc;

use link_board::config::ClientConfig;
use link_board::session::SessionHolder;
use link_board::storage::{AUTH_TOKEN_KEY, Storage};
use link_board::users::UserService;

/// Path fragments identifying authentication routes.
const AUTH_ROUTE_FRAGMENTS: [&str; 3] = ["/sign-in", "/sign-up", "logout"];

/// Whether a path belongs to an authentication screen.
pub fn is_auth_route(path: &str) -> bool {
    AUTH_ROUTE_FRAGMENTS
        .iter()
        .any(|fragment| path.contains(fragment))
}

/// Top-level controller for navigation and session lifetime.
pub struct Shell {
    config: ClientConfig,
    storage: Storage,
    session: Arc<SessionHolder>,
    users: UserService,
    path: String,
    auth_route: bool,
}

impl Shell {
    pub fn new(
        config: ClientConfig,
        storage: Storage,
        session: Arc<SessionHolder>,
        users: UserService,
    ) -> Self {
        let path = "/".to_string();
        let auth_route = is_auth_route(&path);
        Self {
            config,
            storage,
            session,
            users,
            path,
            auth_route,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_auth_route(&self) -> bool {
        self.auth_route
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the session at startup.
    pub async fn init(&self) {
        self.session.resolve(&self.users).await;
    }

    /// Complete a navigation.
    ///
    /// Re-evaluates the auth-route flag; leaving an auth route for a
    /// non-auth route refreshes the session.
    pub async fn navigate(&mut self, path: &str) {
        let was_auth_route = self.auth_route;
        self.path = path.to_string();
        self.auth_route = is_auth_route(path);
        if was_auth_route && !self.auth_route {
            self.session.resolve(&self.users).await;
        }
    }

    /// Log out.
    ///
    /// The server call is fire-and-forget: whatever its outcome, the
    /// cached user, the persisted credential and the in-memory session
    /// are cleared, and the returned destination is the external login
    /// URL the caller hard-navigates to.
    pub async fn logout(&mut self) -> String {
        if let Err(error) = self.users.logout().await {
            log::warn!("logout endpoint failed: {error}");
        }
        self.session.set(None);
        self.storage.remove_item(AUTH_TOKEN_KEY);
        // Hard navigation, not a router transition.
        self.path = "/sign-in".to_string();
        self.auth_route = true;
        self.config.login_url.clone()
    }

    /// Route for a search submission.
    pub fn search_route(query: &str) -> String {
        format!("/search?query={}", urlencoding::encode(query))
    }
}
