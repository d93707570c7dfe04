use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};
use url::Url;

use crate::config::AuthConfig;
use crate::delegation::DelegationRequest;
use crate::device::DeviceIdentifier;
use crate::error::{Error, HttpStatus};
#[cfg(feature = "reqwest")]
use crate::http::ReqwestExchange;
use crate::http::{HttpExchange, HttpRequest, HttpResponse};
use crate::launcher::{InteractiveLoginLauncher, LaunchOutcome};
use crate::scope::{self, OFFLINE_ACCESS};
use crate::session::Session;
use crate::{state, token};

/// `api_type` used for renew/refresh against the client's own application.
const APP_API_TYPE: &str = "app";

/// Resource-owner password login.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PasswordLogin {
    pub connection: String,
    pub username: String,
    pub password: String,
    pub with_refresh_token: bool,
    pub scope: Option<String>,
}

impl PasswordLogin {
    #[must_use]
    pub fn new(
        connection: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            connection: connection.into(),
            username: username.into(),
            password: password.into(),
            with_refresh_token: false,
            scope: None,
        }
    }

    /// Ask for a refresh token (adds `offline_access` to the scope).
    #[must_use]
    pub fn with_refresh_token(mut self, enabled: bool) -> Self {
        self.with_refresh_token = enabled;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Redirect-based login through the host's login UI.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct InteractiveLogin {
    pub connection: Option<String>,
    pub with_refresh_token: bool,
    pub scope: Option<String>,
}

impl InteractiveLogin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the provider's connection picker and go straight to `connection`.
    #[must_use]
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    #[must_use]
    pub fn with_refresh_token(mut self, enabled: bool) -> Self {
        self.with_refresh_token = enabled;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Authorize URL plus the CSRF `state` embedded in it.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: String,
}

/// Login, delegation and refresh against an identity provider.
///
/// Owns the current [`Session`]. Every operation that writes the session takes
/// `&mut self`; share a client between tasks behind a `tokio::sync::Mutex`.
/// The session is only written after the last network round-trip of an
/// operation, so a failed or dropped call leaves it as it was.
pub struct AuthClient<H, D, L> {
    config: AuthConfig,
    http: H,
    device: D,
    launcher: L,
    session: Option<Session>,
}

#[cfg(feature = "reqwest")]
impl<D, L> AuthClient<ReqwestExchange, D, L>
where
    D: DeviceIdentifier,
    L: InteractiveLoginLauncher,
{
    /// Create a client that talks to the provider over `reqwest`.
    #[must_use]
    pub fn new(config: AuthConfig, device: D, launcher: L) -> Self {
        Self::with_exchange(config, ReqwestExchange::new(), device, launcher)
    }
}

impl<H, D, L> AuthClient<H, D, L>
where
    H: HttpExchange,
    D: DeviceIdentifier,
    L: InteractiveLoginLauncher,
{
    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_exchange(config: AuthConfig, http: H, device: D, launcher: L) -> Self {
        Self {
            config,
            http,
            device,
            launcher,
            session: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Reinstate a session persisted by the caller.
    pub fn restore_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Remove and return the session without touching browser state.
    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Log in with username and password (resource-owner grant).
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if the provider rejects the credentials
    /// - [`Error::Protocol`] if no `access_token` comes back
    /// - [`Error::Transport`] on network failure or an uninterpretable reply
    ///
    /// The existing session is untouched on error.
    pub async fn login(&mut self, request: PasswordLogin) -> Result<&Session, Error> {
        let scope = self.resolve_scope(request.scope.as_deref(), request.with_refresh_token);

        let mut form = vec![
            ("client_id".to_owned(), self.config.client_id.clone()),
            ("connection".to_owned(), request.connection.clone()),
            ("username".to_owned(), request.username),
            ("password".to_owned(), request.password),
            ("grant_type".to_owned(), "password".to_owned()),
            ("scope".to_owned(), scope.clone()),
        ];
        if scope::has_scope(&scope, OFFLINE_ACCESS) {
            form.push(("device".to_owned(), self.device.device_id().await?));
        }

        let mut props = self.post_json(&self.config.token_url, form).await?;

        let access_token = non_empty_str(&props, "access_token")
            .ok_or_else(|| Error::Protocol("expected access_token, none received".into()))?
            .to_owned();

        let profile = self.fetch_profile(&access_token).await?;
        props.insert("profile".to_owned(), profile);

        tracing::info!(connection = %request.connection, "Password login successful");

        Ok(self.establish(&props))
    }

    /// Build the authorize URL for a redirect login.
    ///
    /// Useful for hosts that drive the browser themselves; the returned
    /// `state` must match the one echoed back on the redirect.
    ///
    /// # Errors
    ///
    /// Propagates [`DeviceIdentifier`] failures when offline access is requested.
    pub async fn authorize_url(
        &self,
        request: &InteractiveLogin,
    ) -> Result<AuthorizationRequest, Error> {
        let scope = self.resolve_scope(request.scope.as_deref(), request.with_refresh_token);
        let device = if scope::has_scope(&scope, OFFLINE_ACCESS) {
            Some(self.device.device_id().await?)
        } else {
            None
        };
        let state = state::generate_state();

        let mut url = self.config.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "token")
                .append_pair("redirect_uri", self.config.redirect_uri.as_str())
                .append_pair("scope", &scope);
            if let Some(connection) = request.connection.as_deref().filter(|c| !c.is_empty()) {
                query.append_pair("connection", connection);
            }
            query.append_pair("state", &state);
            if let Some(device) = &device {
                query.append_pair("device", device);
            }
        }

        Ok(AuthorizationRequest { url, state })
    }

    /// Log in through the host's login UI (redirect grant).
    ///
    /// The profile fetch after a successful redirect is best-effort: if it
    /// fails, the session is created without a profile.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if the user dismissed the UI
    /// - [`Error::Authentication`] if the UI or provider reported an error
    pub async fn login_interactive(
        &mut self,
        request: InteractiveLogin,
    ) -> Result<&Session, Error> {
        let auth_req = self.authorize_url(&request).await?;

        let mut props = match self.launcher.launch(&auth_req.url).await {
            LaunchOutcome::Authenticated(props) => props,
            LaunchOutcome::Cancelled => {
                tracing::debug!("Interactive login cancelled");
                return Err(Error::Cancelled);
            }
            LaunchOutcome::Failed(message) => {
                tracing::warn!(error = %message, "Interactive login failed");
                return Err(Error::Authentication(message));
            }
        };

        if let Some(message) = provider_error(&props) {
            return Err(Error::Authentication(message));
        }

        if let Some(access_token) = non_empty_str(&props, "access_token").map(str::to_owned) {
            match self.fetch_profile(&access_token).await {
                Ok(profile) => {
                    props.insert("profile".to_owned(), profile);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Profile fetch failed, continuing without profile");
                }
            }
        }

        tracing::info!("Interactive login successful");

        Ok(self.establish(&props))
    }

    /// Exchange an ID token or refresh token for a delegation token.
    ///
    /// When the response carries an `id_token`, the session's ID token is
    /// replaced (or a session is started if there is none). The full response
    /// is returned either way.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if both tokens are given, or neither is given
    ///   and there is no session (checked before any request)
    /// - [`Error::Authentication`] if the provider rejects the exchange
    pub async fn delegation_token(
        &mut self,
        mut request: DelegationRequest,
    ) -> Result<Map<String, JsonValue>, Error> {
        match (request.id_token.is_empty(), request.refresh_token.is_empty()) {
            (false, false) => {
                return Err(Error::InvalidState(
                    "provide exactly one of id_token or refresh_token, not both".into(),
                ));
            }
            (true, true) => {
                request.id_token = self.current_id_token().ok_or_else(|| {
                    Error::InvalidState(
                        "must login first or supply an id_token or refresh_token".into(),
                    )
                })?;
            }
            _ => {}
        }

        let form = request.form_params(&self.config.client_id);
        let response = self.post_json(&self.config.delegation_url, form).await?;

        if let Some(id_token) = non_empty_str(&response, "id_token") {
            match self.session.as_mut() {
                Some(session) => session.id_token = id_token.to_owned(),
                None => {
                    self.session = Some(Session::new(
                        "",
                        id_token,
                        Some(request.refresh_token),
                        JsonValue::Null,
                    ));
                }
            }
        }

        Ok(response)
    }

    /// Get a fresh ID token for the current session.
    ///
    /// Sends `scope=passthrough` unless `options` already names a scope.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] without an active session; otherwise as
    /// [`delegation_token`](Self::delegation_token).
    pub async fn renew_id_token(
        &mut self,
        mut options: BTreeMap<String, String>,
    ) -> Result<Map<String, JsonValue>, Error> {
        let id_token = self.current_id_token().ok_or_else(|| {
            Error::InvalidState("renewing the id_token requires an active session".into())
        })?;
        options
            .entry("scope".to_owned())
            .or_insert_with(|| "passthrough".to_owned());

        let request = DelegationRequest::new()
            .with_api_type(APP_API_TYPE)
            .with_id_token(id_token)
            .with_options(options);
        self.delegation_token(request).await
    }

    /// Mint a new ID token from a refresh token.
    ///
    /// Falls back to the session's refresh token when `refresh_token` is
    /// `None` or empty.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if no refresh token is available; otherwise as
    /// [`delegation_token`](Self::delegation_token).
    pub async fn refresh_token(
        &mut self,
        refresh_token: Option<&str>,
        options: BTreeMap<String, String>,
    ) -> Result<Map<String, JsonValue>, Error> {
        let refresh_token = match refresh_token.filter(|t| !t.is_empty()) {
            Some(token) => token.to_owned(),
            None => self
                .session
                .as_ref()
                .and_then(Session::refresh_token)
                .map(str::to_owned)
                .ok_or_else(|| {
                    Error::InvalidState(
                        "no refresh token: pass one or login with offline access".into(),
                    )
                })?,
        };

        let request = DelegationRequest::new()
            .with_api_type(APP_API_TYPE)
            .with_refresh_token(refresh_token)
            .with_options(options);
        self.delegation_token(request).await
    }

    /// Whether the session's ID token is past its `exp`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] without an active session, [`Error::Token`] if
    /// the ID token cannot be decoded.
    pub fn has_token_expired(&self) -> Result<bool, Error> {
        let session = self
            .session
            .as_ref()
            .filter(|s| s.has_id_token())
            .ok_or_else(|| Error::InvalidState("no active session with an id_token".into()))?;
        token::has_expired(&session.id_token)
    }

    /// Clear the session and the login UI's cookies. No-op when logged out.
    pub fn logout(&mut self) {
        if self.session.take().is_none() {
            return;
        }
        self.launcher.clear_cookies();
        tracing::info!("Logged out");
    }

    fn resolve_scope(&self, scope: Option<&str>, with_refresh_token: bool) -> String {
        scope::resolve(
            scope.unwrap_or(&self.config.default_scope),
            with_refresh_token,
        )
    }

    fn current_id_token(&self) -> Option<String> {
        self.session
            .as_ref()
            .filter(|s| s.has_id_token())
            .map(|s| s.id_token.clone())
    }

    fn establish(&mut self, props: &Map<String, JsonValue>) -> &Session {
        self.session.insert(Session::from_account_properties(props))
    }

    async fn post_json(
        &self,
        url: &Url,
        form: Vec<(String, String)>,
    ) -> Result<Map<String, JsonValue>, Error> {
        tracing::debug!(path = %url.path(), "POST");
        let response = self
            .http
            .send(HttpRequest::post_form(url.clone(), form))
            .await?;
        parse_response(response)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<JsonValue, Error> {
        let mut url = self.config.userinfo_url.clone();
        url.query_pairs_mut()
            .append_pair("access_token", access_token);
        tracing::debug!(path = %url.path(), "GET");
        let response = self.http.send(HttpRequest::get(url)).await?;
        parse_response(response).map(JsonValue::Object)
    }
}

/// Interprets a provider reply.
///
/// An `error` member wins over the status code; a non-2xx reply without one
/// is a transport failure.
fn parse_response(response: HttpResponse) -> Result<Map<String, JsonValue>, Error> {
    let parsed = serde_json::from_str::<JsonValue>(&response.body);
    let body = match parsed {
        Ok(JsonValue::Object(map)) => map,
        _ if !response.is_success() => {
            return Err(HttpStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }
        Ok(_) => return Err(Error::Protocol("expected a JSON object response".into())),
        Err(e) => return Err(Error::Protocol(format!("invalid JSON response: {e}"))),
    };

    if let Some(message) = provider_error(&body) {
        tracing::warn!(status = response.status, error = %message, "Provider returned an error");
        return Err(Error::Authentication(message));
    }

    if !response.is_success() {
        return Err(HttpStatus {
            status: response.status,
            body: response.body,
        }
        .into());
    }

    Ok(body)
}

/// `error` / `error_description` from a provider reply, as one message.
fn provider_error(body: &Map<String, JsonValue>) -> Option<String> {
    let error = match body.get("error")? {
        JsonValue::Null => return None,
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    match body.get("error_description").and_then(JsonValue::as_str) {
        Some(description) if !description.is_empty() => Some(format!("{error}: {description}")),
        _ => Some(error),
    }
}

fn non_empty_str<'a>(body: &'a Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
}
