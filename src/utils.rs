use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
use url::Url;

/// Unreserved characters allowed in a PKCE code verifier (RFC 7636 §4.1).
pub const RANDOM_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub const CODE_VERIFIER_LENGTH: usize = 64;
pub const STATE_LENGTH: usize = 16;

/// Returns `length` characters drawn uniformly from [`RANDOM_ALPHABET`].
///
/// `rand::rng()` is a CSPRNG reseeded from the operating system, which the
/// verifier and the anti-CSRF state both require.
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| RANDOM_ALPHABET[rng.random_range(0..RANDOM_ALPHABET.len())] as char)
        .collect()
}

pub fn generate_code_verifier() -> String {
    generate_random_string(CODE_VERIFIER_LENGTH)
}

pub fn generate_state() -> String {
    generate_random_string(STATE_LENGTH)
}

/// SHA-256 of the verifier, base64url-encoded without padding.
pub fn create_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Extracts `ID` from a `spotify:track:ID` URI.
pub fn track_id_from_uri(uri: &str) -> Option<&str> {
    uri.split(':').nth(2).filter(|id| !id.is_empty())
}

/// Drops the named query parameters from `url`, keeping the others in order.
///
/// An emptied query is removed entirely so the URL does not end in `?`.
pub fn strip_query_params(url: &mut Url, names: &[&str]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !names.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

/// First value of query parameter `name`, if present.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
