//! CSPRNG helpers for alphanumeric strings.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Default length of generated passwords. With a 62-symbol alphabet
/// (~5.95 bits per symbol) this gives roughly 190 bits.
pub const DEFAULT_PASSWORD_LEN: usize = 32;

/// Return a random string of `len` characters drawn from `a-zA-Z0-9`.
///
/// Used for generated passwords, the listing tag and payload padding.
pub fn alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a random password of `len` characters.
pub fn password(len: usize) -> String {
    alphanumeric(len)
}
