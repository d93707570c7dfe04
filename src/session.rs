use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The signed-in user: tokens plus the provider profile.
///
/// Serializable so the caller can persist it between runs and hand it back
/// via [`AuthClient::restore_session`](crate::AuthClient::restore_session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Session {
    pub access_token: String,
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub profile: JsonValue,
}

impl Session {
    /// Create a session from its parts. An empty refresh token is stored as `None`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: Option<String>,
        profile: JsonValue,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: id_token.into(),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            profile,
        }
    }

    /// Build a session from account properties returned by a login flow.
    ///
    /// Reads `access_token`, `id_token`, `refresh_token` and `profile`;
    /// absent fields become empty.
    #[must_use]
    pub fn from_account_properties(props: &Map<String, JsonValue>) -> Self {
        let text = |key: &str| {
            props
                .get(key)
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        Self::new(
            text("access_token"),
            text("id_token"),
            Some(text("refresh_token")),
            props.get("profile").cloned().unwrap_or(JsonValue::Null),
        )
    }

    /// Refresh token, if offline access was granted.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Whether the session carries a usable ID token.
    #[must_use]
    pub fn has_id_token(&self) -> bool {
        !self.id_token.is_empty()
    }
}
