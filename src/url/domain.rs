use url::Url;

/// Extracts the host from a URL, lowercased
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_scribe::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs share the same host
///
/// Ports and schemes are ignored; only the hostname decides crawl scope.
/// URLs without a host are never considered in scope.
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extract_with_port() {
        assert_eq!(
            extract_domain(&url("https://example.com:8080/")),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_extract_mixed_case() {
        assert_eq!(
            extract_domain(&url("https://Blog.Example.COM/post")),
            Some("blog.example.com".to_string())
        );
    }

    #[test]
    fn test_no_host() {
        assert_eq!(extract_domain(&url("data:text/plain,hello")), None);
    }

    #[test]
    fn test_same_host_ignores_path_scheme_and_port() {
        assert!(is_same_host(
            &url("https://example.com/a"),
            &url("http://example.com:8080/b?q=1")
        ));
    }

    #[test]
    fn test_subdomain_is_a_different_host() {
        assert!(!is_same_host(
            &url("https://example.com/"),
            &url("https://blog.example.com/")
        ));
    }

    #[test]
    fn test_hostless_url_is_out_of_scope() {
        assert!(!is_same_host(
            &url("https://example.com/"),
            &url("mailto:someone@example.com")
        ));
    }
}
