//! Syntactic predicates over the character classes defined in RFC 6749 Appendix A.

/// `VSCHAR = %x20-7E` — visible printable ASCII, used for client ids/secrets, codes, state.
pub fn is_vschar_str(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// `NCHAR = %x2D / %x2E / %x5F / ALPHA / DIGIT` — grant-type / response-type name characters.
fn is_nchar(b: u8) -> bool {
    b == b'-' || b == b'.' || b == b'_' || b.is_ascii_alphanumeric()
}

/// `NQCHAR = %x21 / %x23-5B / %x5D-7E` — scope-token characters (no space, no quote).
fn is_nqchar(b: u8) -> bool {
    b == 0x21 || (0x23..=0x5B).contains(&b) || (0x5D..=0x7E).contains(&b)
}

/// `NQSCHAR = NQCHAR | SP` — space-delimited scope strings.
pub fn is_nqschar_str(s: &str) -> bool {
    s.bytes().all(|b| is_nqchar(b) || b == b' ')
}

/// `UNICODECHARNOCRLF` — any Unicode scalar value except CR/LF, used for username/password.
pub fn is_unicodecharnocrlf_str(s: &str) -> bool {
    s.chars().all(|c| c != '\r' && c != '\n')
}

/// A `grant_type` or `response_type` value: `NCHAR` or an extension URI (RFC 6749 §8.3/8.4).
pub fn is_grant_or_response_type_name(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.bytes().all(is_nchar) {
        return true;
    }
    is_uri(s)
}

/// A syntactically well-formed absolute URI (scheme + authority or opaque part).
///
/// This is deliberately permissive: the library does not speak URI grammar in full,
/// it only rejects what obviously cannot be a redirect target or extension-grant URI.
pub fn is_uri(s: &str) -> bool {
    let Some(colon) = s.find(':') else {
        return false;
    };
    let (scheme, rest) = s.split_at(colon);
    if scheme.is_empty() || !scheme.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    if !scheme
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
    {
        return false;
    }
    let rest = &rest[1..];
    !rest.is_empty() && rest.bytes().all(|b| (0x21..=0x7E).contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vschar_rejects_control_and_empty() {
        assert!(is_vschar_str("abc-123.~_"));
        assert!(!is_vschar_str(""));
        assert!(!is_vschar_str("ab\nc"));
        assert!(!is_vschar_str("ab\tc"));
    }

    #[test]
    fn nqschar_allows_spaces_not_quotes() {
        assert!(is_nqschar_str("read write"));
        assert!(!is_nqschar_str("read\"write"));
        assert!(!is_nqschar_str("read\\write"));
    }

    #[test]
    fn unicodecharnocrlf_rejects_newlines() {
        assert!(is_unicodecharnocrlf_str("p@ssw0rd-日本語"));
        assert!(!is_unicodecharnocrlf_str("line1\nline2"));
        assert!(!is_unicodecharnocrlf_str("line1\rline2"));
    }

    #[test]
    fn grant_type_name_accepts_nchar_and_uri() {
        assert!(is_grant_or_response_type_name("authorization_code"));
        assert!(is_grant_or_response_type_name("refresh_token"));
        assert!(is_grant_or_response_type_name("urn:ietf:params:oauth:grant-type:device_code"));
        assert!(!is_grant_or_response_type_name(""));
        assert!(!is_grant_or_response_type_name("has space"));
    }

    #[test]
    fn uri_requires_scheme_and_nonempty_rest() {
        assert!(is_uri("https://x.test/cb"));
        assert!(is_uri("urn:ietf:params:oauth:grant-type:device_code"));
        assert!(!is_uri("not-a-uri"));
        assert!(!is_uri("https://"));
    }
}
