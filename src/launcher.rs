use std::future::Future;

use serde_json::{Map, Value as JsonValue};
use url::Url;

/// How an interactive login ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchOutcome {
    /// Redirect completed; raw account properties parsed from the callback
    /// (`access_token`, `id_token`, `refresh_token`, ...).
    Authenticated(Map<String, JsonValue>),
    /// The user dismissed the login UI.
    Cancelled,
    /// The UI or the provider reported an error.
    Failed(String),
}

/// Host-specific login UI (browser tab, web view, system auth session).
///
/// The launcher presents `authorize_url`, waits for the redirect back to the
/// configured redirect URI, checks the `state` parameter it finds there, and
/// reports the outcome. It may suspend for as long as the user takes.
pub trait InteractiveLoginLauncher: Send + Sync {
    fn launch(&self, authorize_url: &Url) -> impl Future<Output = LaunchOutcome> + Send;

    /// Forget browser cookies left by previous logins. Fire-and-forget.
    fn clear_cookies(&self);
}

/// Launcher for hosts without a browser; interactive login always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessLauncher;

impl InteractiveLoginLauncher for HeadlessLauncher {
    async fn launch(&self, _authorize_url: &Url) -> LaunchOutcome {
        LaunchOutcome::Failed("interactive login is not available on this host".into())
    }

    fn clear_cookies(&self) {}
}
