use std::collections::BTreeMap;

/// `grant_type` sent to the delegation endpoint.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// A delegation-token request.
///
/// Supply at most one of `id_token` / `refresh_token`; with neither, the
/// client falls back to the session's ID token.
///
/// ```rust,ignore
/// let request = DelegationRequest::new()
///     .with_api_type("firebase")
///     .with_target("target-client-id")
///     .with_option("scope", "openid email");
/// let response = client.delegation_token(request).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct DelegationRequest {
    pub api_type: String,
    pub id_token: String,
    pub refresh_token: String,
    pub target: String,
    pub options: BTreeMap<String, String>,
}

impl DelegationRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_type(mut self, api_type: impl Into<String>) -> Self {
        self.api_type = api_type.into();
        self
    }

    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = id_token.into();
        self
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = refresh_token.into();
        self
    }

    /// Target client id the delegated token is issued for.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Add an extra form parameter.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: BTreeMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    /// Form parameters for the delegation endpoint.
    ///
    /// Named fields override same-named options. Keys with empty values are
    /// omitted from the result.
    pub(crate) fn form_params(&self, client_id: &str) -> Vec<(String, String)> {
        let mut params = self.options.clone();
        let named = [
            ("id_token", self.id_token.as_str()),
            ("api_type", self.api_type.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("target", self.target.as_str()),
            ("grant_type", JWT_BEARER_GRANT),
            ("client_id", client_id),
        ];
        for (key, value) in named {
            params.insert(key.to_owned(), value.to_owned());
        }
        params.into_iter().filter(|(_, v)| !v.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &[(String, String)]) -> Vec<&str> {
        params.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn empty_values_never_sent() {
        let params = DelegationRequest::new()
            .with_id_token("idt")
            .with_option("extra", "")
            .form_params("client");

        assert!(params.iter().all(|(_, v)| !v.is_empty()));
        assert_eq!(keys(&params), ["client_id", "grant_type", "id_token"]);
    }

    #[test]
    fn all_fields_present() {
        let params = DelegationRequest::new()
            .with_api_type("app")
            .with_refresh_token("rt")
            .with_target("other")
            .with_option("scope", "passthrough")
            .form_params("client");

        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("api_type"), Some("app"));
        assert_eq!(get("refresh_token"), Some("rt"));
        assert_eq!(get("target"), Some("other"));
        assert_eq!(get("scope"), Some("passthrough"));
        assert_eq!(get("grant_type"), Some(JWT_BEARER_GRANT));
        assert_eq!(get("client_id"), Some("client"));
        assert_eq!(get("id_token"), None);
    }

    #[test]
    fn named_fields_override_options() {
        let params = DelegationRequest::new()
            .with_option("grant_type", "password")
            .with_option("api_type", "caller")
            .with_api_type("app")
            .form_params("client");

        assert!(params.contains(&("grant_type".into(), JWT_BEARER_GRANT.into())));
        assert!(params.contains(&("api_type".into(), "app".into())));
    }

    #[test]
    fn empty_named_field_does_not_leak_option() {
        // An option named like an empty named field is dropped, not sent.
        let params = DelegationRequest::new()
            .with_option("target", "from-options")
            .form_params("client");
        assert!(!keys(&params).contains(&"target"));
    }
}
