//! DNS-01 record derivation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Label prepended to a domain to form its challenge record name.
pub const ACME_CHALLENGE_RECORD: &str = "_acme-challenge";

/// The fully qualified record name and the TXT value an ACME server expects to find for
/// `domain` given the challenge key authorization.
///
/// The value is the base64url-encoded (unpadded) SHA-256 digest of `key_auth`, per
/// [RFC-8555 section 8.4](https://www.rfc-editor.org/rfc/rfc8555#section-8.4).
#[must_use]
pub fn record(domain: &str, key_auth: &str) -> (String, String) {
    let domain = base_domain(domain).trim_end_matches('.');
    let fqdn = format!("{ACME_CHALLENGE_RECORD}.{domain}.");
    let value = URL_SAFE_NO_PAD.encode(Sha256::digest(key_auth.as_bytes()));
    (fqdn, value)
}

/// The domain a challenge is published for. Wildcard certificates are validated against their
/// base domain, so `*.example.com` yields `example.com`.
#[must_use]
pub fn base_domain(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let (fqdn, value) = record("example.com", "token.thumbprint");
        assert_eq!(fqdn, "_acme-challenge.example.com.");
        assert_eq!(value, "61rBZ_4knHblO0MNoxFsXZ_eTFUHum0B6IVRbhvUn5I");
    }

    #[test]
    fn test_record_fqdn_input() {
        let (fqdn, _) = record("example.com.", "token.thumbprint");
        assert_eq!(fqdn, "_acme-challenge.example.com.");
    }

    #[test]
    fn test_wildcard_record() {
        let (fqdn, value) = record("*.example.com", "token.thumbprint");
        assert_eq!(fqdn, "_acme-challenge.example.com.");
        assert_eq!(value, record("example.com", "token.thumbprint").1);
    }

    #[test]
    fn test_base_domain() {
        assert_eq!(base_domain("*.example.com"), "example.com");
        assert_eq!(base_domain("sub.example.com"), "sub.example.com");
    }
}
