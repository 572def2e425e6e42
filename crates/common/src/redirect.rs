//! Same-origin check for post-login redirect targets.
use url::Url;

/// Returns true when `target` stays on `host`.
///
/// `target` is resolved against `http://{host}/` the way a browser would
/// resolve a `Location` header, so relative paths are accepted while
/// absolute and scheme-relative URLs must name the same host and port.
/// Only `http` and `https` are accepted. Anything that fails to parse is
/// treated as unsafe.
///
/// ```
/// use assetreg_common::is_safe_url;
///
/// assert!(is_safe_url("example.com", "/profile"));
/// assert!(!is_safe_url("example.com", "http://evil.com/x"));
/// assert!(!is_safe_url("example.com", "//evil.com/x"));
/// ```
pub fn is_safe_url(host: &str, target: &str) -> bool {
    let Ok(base) = Url::parse(&format!("http://{host}/")) else {
        return false;
    };
    // A host header carrying a path or credentials is not a plain host.
    if base.path() != "/" || !base.username().is_empty() || base.password().is_some() {
        return false;
    }
    let Ok(resolved) = base.join(target) else {
        return false;
    };

    matches!(resolved.scheme(), "http" | "https")
        && resolved.host_str().is_some()
        && resolved.host_str() == base.host_str()
        && resolved.port() == base.port()
        && resolved.username() == base.username()
        && resolved.password() == base.password()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_targets_are_safe() {
        assert!(is_safe_url("example.com", "/profile"));
        assert!(is_safe_url("example.com", "/admin/asset/new?x=1#top"));
        assert!(is_safe_url("example.com", "profile"));
        assert!(is_safe_url("example.com", "../../etc"));
        assert!(is_safe_url("example.com", ""));
    }

    #[test]
    fn test_same_host_absolute_targets_are_safe() {
        assert!(is_safe_url("example.com", "http://example.com/x"));
        assert!(is_safe_url("example.com", "https://example.com/x"));
        assert!(is_safe_url("EXAMPLE.com", "http://example.COM/x"));
        assert!(is_safe_url("localhost:5000", "http://localhost:5000/asset/a/"));
    }

    #[test]
    fn test_foreign_hosts_are_unsafe() {
        assert!(!is_safe_url("example.com", "http://evil.com/x"));
        assert!(!is_safe_url("example.com", "https://evil.com"));
        assert!(!is_safe_url("example.com", "//evil.com/x"));
        assert!(!is_safe_url("example.com", "///evil.com/x"));
        assert!(!is_safe_url("example.com", "/\\evil.com"));
        assert!(!is_safe_url("example.com", "http://example.com.evil.com/"));
    }

    #[test]
    fn test_port_and_credentials_must_match() {
        assert!(!is_safe_url("localhost:5000", "http://localhost:6000/"));
        assert!(!is_safe_url("localhost:5000", "http://localhost/"));
        assert!(!is_safe_url("example.com", "http://user@example.com/"));
        assert!(!is_safe_url("example.com", "http://user:pw@example.com/"));
    }

    #[test]
    fn test_non_http_schemes_are_unsafe() {
        assert!(!is_safe_url("example.com", "javascript:alert(1)"));
        assert!(!is_safe_url("example.com", "ftp://example.com/x"));
        assert!(!is_safe_url("example.com", "data:text/html,hi"));
        assert!(!is_safe_url("example.com", "mailto:a@example.com"));
    }

    #[test]
    fn test_malformed_input_is_unsafe() {
        assert!(!is_safe_url("", "/profile"));
        assert!(!is_safe_url("exa mple.com", "/profile"));
        assert!(!is_safe_url("example.com/path", "/profile"));
        assert!(!is_safe_url("example.com", "http://[::1"));
        assert!(!is_safe_url("example.com", "http://"));
    }
}
