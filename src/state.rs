use rand::Rng;
use rand::distr::Alphabetic;

/// Length of the CSRF `state` parameter.
pub const STATE_LEN: usize = 32;

/// Generates a cryptographically random `state` parameter for the authorize request.
///
/// Returns a 32-character string drawn from `[A-Za-z]`.
#[must_use]
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphabetic)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}
