use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::error::Error;

/// Unverified claims decoded from an ID token payload.
///
/// The signature is not checked: the token came straight from the
/// authorization server and is only inspected for client-side bookkeeping.
#[derive(Debug, Clone)]
pub struct IdTokenClaims {
    inner: JsonValue,
}

impl IdTokenClaims {
    /// Gets a claim value by key.
    #[must_use]
    pub fn claim(&self, key: &str) -> Option<&JsonValue> {
        self.inner.get(key)
    }

    /// The `sub` claim, if present.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.inner.get("sub").and_then(JsonValue::as_str)
    }

    /// Expiry from the `exp` claim (seconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// Returns `Error::Token` if `exp` is missing, not numeric, or out of range.
    pub fn expires_at(&self) -> Result<OffsetDateTime, Error> {
        let exp = self
            .inner
            .get("exp")
            .ok_or_else(|| Error::Token("missing claim: exp".into()))?;
        // Some providers emit fractional seconds.
        let secs = exp
            .as_i64()
            .or_else(|| exp.as_f64().map(|f| f as i64))
            .ok_or_else(|| Error::Token("claim exp is not numeric".into()))?;
        OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| Error::Token(format!("claim exp out of range: {e}")))
    }

    /// Gets the inner JSON value.
    #[must_use]
    pub fn as_json(&self) -> &JsonValue {
        &self.inner
    }
}

/// Decodes the payload segment of a JWT without verifying its signature.
///
/// # Errors
///
/// Returns `Error::Token` if the token is not three dot-separated segments,
/// the payload is not base64url, or it does not hold a JSON object.
pub fn decode_claims(token: &str) -> Result<IdTokenClaims, Error> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::Token("invalid token format".into()));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| Error::Token("invalid payload encoding".into()))?;

    let inner: JsonValue =
        serde_json::from_slice(&payload).map_err(|_| Error::Token("invalid payload".into()))?;
    if !inner.is_object() {
        return Err(Error::Token("payload is not a claims object".into()));
    }

    Ok(IdTokenClaims { inner })
}

/// Whether `token` has expired at `now`.
///
/// A token is expired from the instant named by `exp` onwards.
///
/// # Errors
///
/// Returns `Error::Token` if the token cannot be decoded or has no usable `exp`.
pub fn is_expired_at(token: &str, now: OffsetDateTime) -> Result<bool, Error> {
    let expires_at = decode_claims(token)?.expires_at()?;
    Ok(now >= expires_at)
}

/// Whether `token` has expired, against the current UTC time.
///
/// # Errors
///
/// See [`is_expired_at`].
pub fn has_expired(token: &str) -> Result<bool, Error> {
    is_expired_at(token, OffsetDateTime::now_utc())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an unsigned JWT carrying `claims`.
    pub(crate) fn make_token(claims: &JsonValue) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    fn now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn past_exp_is_expired() {
        let token = make_token(&serde_json::json!({ "sub": "u1", "exp": now() - 60 }));
        assert!(has_expired(&token).unwrap());
    }

    #[test]
    fn future_exp_is_not_expired() {
        let token = make_token(&serde_json::json!({ "sub": "u1", "exp": now() + 3600 }));
        assert!(!has_expired(&token).unwrap());
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let token = make_token(&serde_json::json!({ "exp": 1_700_000_000 }));
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert!(is_expired_at(&token, at).unwrap());
        assert!(!is_expired_at(&token, at - time::Duration::seconds(1)).unwrap());
    }

    #[test]
    fn padded_payload_accepted() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":10}"#);
        assert!(payload.ends_with('='));
        let token = format!("h.{payload}.s");
        assert!(decode_claims(&token).is_ok());
    }

    #[test]
    fn claims_accessors() {
        let token = make_token(&serde_json::json!({ "sub": "auth0|42", "exp": 10, "aud": "c" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.subject(), Some("auth0|42"));
        assert_eq!(claims.claim("aud").and_then(JsonValue::as_str), Some("c"));
        assert_eq!(claims.expires_at().unwrap().unix_timestamp(), 10);
    }

    #[test]
    fn missing_exp_is_token_error() {
        let token = make_token(&serde_json::json!({ "sub": "u1" }));
        assert!(matches!(has_expired(&token), Err(Error::Token(_))));
    }

    #[test]
    fn malformed_tokens_rejected() {
        assert!(matches!(decode_claims("not-a-jwt"), Err(Error::Token(_))));
        assert!(matches!(decode_claims("a.!!!.c"), Err(Error::Token(_))));
        let array = URL_SAFE_NO_PAD.encode("[1,2]");
        assert!(matches!(decode_claims(&format!("a.{array}.c")), Err(Error::Token(_))));
    }
}
