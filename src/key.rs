//! Storage key derivation for DNS-01 challenges.
//!
//! The same functions are used when a challenge is written by the
//! [ACME provider][crate::acme::ChallengeProvider] and when it is read back by the
//! [DNS handler][crate::dns], so the two always agree on where a challenge lives.

/// Replace every period in `domain` with a hyphen, so that `example.com` becomes `example-com`.
///
/// The result is a single DNS label suitable for use as the left-most label of a
/// `<label>.<cid>.<root>` challenge name. It is never parsed back into a domain.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    domain.replace('.', "-")
}

/// The key a challenge for `domain` is stored under for the tenant identified by `cid`.
#[must_use]
pub fn challenge_key(cid: &str, domain: &str) -> String {
    format!("{}.{cid}", normalize_domain(domain))
}
