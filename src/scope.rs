/// Scope token that asks the provider for a refresh token.
pub const OFFLINE_ACCESS: &str = "offline_access";

/// Default scope when the caller supplies none.
pub const DEFAULT_SCOPE: &str = "openid";

/// Checks whether a space-delimited scope string contains `token` (case-insensitive).
#[must_use]
pub fn has_scope(scope: &str, token: &str) -> bool {
    scope
        .split_whitespace()
        .any(|s| s.eq_ignore_ascii_case(token))
}

/// Appends `offline_access` unless already present.
#[must_use]
pub fn with_offline_access(scope: &str) -> String {
    if has_scope(scope, OFFLINE_ACCESS) {
        return scope.to_owned();
    }
    let trimmed = scope.trim();
    if trimmed.is_empty() {
        OFFLINE_ACCESS.to_owned()
    } else {
        format!("{trimmed} {OFFLINE_ACCESS}")
    }
}

/// Resolves the scope for a login request.
pub(crate) fn resolve(scope: &str, with_refresh_token: bool) -> String {
    if with_refresh_token {
        with_offline_access(scope)
    } else {
        scope.to_owned()
    }
}
