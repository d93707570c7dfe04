use url::Url;

use crate::error::Error;
use crate::scope::DEFAULT_SCOPE;

/// Identity provider endpoints and client registration.
///
/// Endpoints default to the standard paths under the tenant domain; override
/// individual ones with the `with_*` methods.
///
/// ```rust,ignore
/// use auth_session::AuthConfig;
///
/// let config = AuthConfig::new("my-client-id", "https://tenant.example.com".parse()?)?
///     .with_default_scope("openid profile");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AuthConfig {
    pub(crate) client_id: String,
    pub(crate) authorize_url: Url,
    pub(crate) token_url: Url,
    pub(crate) delegation_url: Url,
    pub(crate) userinfo_url: Url,
    pub(crate) redirect_uri: Url,
    pub(crate) default_scope: String,
}

impl AuthConfig {
    /// Create a configuration for `client_id` on the tenant at `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `domain` cannot serve as a base URL.
    pub fn new(client_id: impl Into<String>, domain: Url) -> Result<Self, Error> {
        let endpoint = |path: &str| {
            domain
                .join(path)
                .map_err(|e| Error::Config(format!("domain {domain}: {e}")))
        };
        Ok(Self {
            client_id: client_id.into(),
            authorize_url: endpoint("/authorize")?,
            token_url: endpoint("/oauth/ro")?,
            delegation_url: endpoint("/delegation")?,
            userinfo_url: endpoint("/userinfo")?,
            redirect_uri: endpoint("/mobile")?,
            default_scope: DEFAULT_SCOPE.into(),
        })
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `AUTH_CLIENT_ID`: OAuth client ID
    /// - `AUTH_DOMAIN`: tenant URL, or a bare host name (`https://` is assumed)
    ///
    /// # Optional env vars
    /// - `AUTH_AUTHORIZE_URL`, `AUTH_TOKEN_URL`, `AUTH_DELEGATION_URL`,
    ///   `AUTH_USERINFO_URL`: endpoint overrides
    /// - `AUTH_REDIRECT_URI`: redirect URI registered for the app
    /// - `AUTH_SCOPE`: default scope string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let client_id = lookup("AUTH_CLIENT_ID")
            .ok_or_else(|| Error::Config("AUTH_CLIENT_ID is required".into()))?;
        let domain = lookup("AUTH_DOMAIN")
            .ok_or_else(|| Error::Config("AUTH_DOMAIN is required".into()))?;
        let domain = if domain.contains("://") {
            domain
        } else {
            format!("https://{domain}")
        };
        let domain: Url = domain
            .parse()
            .map_err(|e| Error::Config(format!("AUTH_DOMAIN: {e}")))?;

        let mut config = Self::new(client_id, domain)?;

        let url_var = |key: &str| -> Result<Option<Url>, Error> {
            lookup(key)
                .map(|s| s.parse().map_err(|e| Error::Config(format!("{key}: {e}"))))
                .transpose()
        };
        if let Some(url) = url_var("AUTH_AUTHORIZE_URL")? {
            config = config.with_authorize_url(url);
        }
        if let Some(url) = url_var("AUTH_TOKEN_URL")? {
            config = config.with_token_url(url);
        }
        if let Some(url) = url_var("AUTH_DELEGATION_URL")? {
            config = config.with_delegation_url(url);
        }
        if let Some(url) = url_var("AUTH_USERINFO_URL")? {
            config = config.with_userinfo_url(url);
        }
        if let Some(url) = url_var("AUTH_REDIRECT_URI")? {
            config = config.with_redirect_uri(url);
        }
        if let Some(scope) = lookup("AUTH_SCOPE") {
            config = config.with_default_scope(scope);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    /// Override the resource-owner (password grant) token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    #[must_use]
    pub fn with_delegation_url(mut self, url: Url) -> Self {
        self.delegation_url = url;
        self
    }

    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, url: Url) -> Self {
        self.redirect_uri = url;
        self
    }

    /// Scope used when a login call does not name one (default: `"openid"`).
    #[must_use]
    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = scope.into();
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn delegation_url(&self) -> &Url {
        &self.delegation_url
    }

    #[must_use]
    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }
}
