//! Hostname to tenant slug resolution.

use crate::config::TenancyConfig;

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "0.0.0.0"];

/// Resolve the tenant slug for a request.
///
/// On loopback and configured development hosts the slug comes from the
/// override header, then the override query parameter. Everywhere else it
/// is the leading label of a host with more labels than the base domain,
/// except `www`. A bare base domain has no tenant.
pub fn resolve(
    config: &TenancyConfig,
    host: Option<&str>,
    header_override: Option<&str>,
    query_override: Option<&str>,
) -> Option<String> {
    let host = strip_port(host?.trim()).trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    if is_dev_host(config, &host) {
        return header_override
            .and_then(normalize)
            .or_else(|| query_override.and_then(normalize));
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= config.base_domain_labels() {
        return None;
    }
    match labels[0] {
        "www" => None,
        first => normalize(first),
    }
}

fn is_dev_host(config: &TenancyConfig, host: &str) -> bool {
    LOOPBACK_HOSTS.contains(&host) || config.dev_hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
}

/// Drop a trailing `:port`, including the bracketed IPv6 form `[::1]:3000`.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &rest[..end],
            None => rest,
        };
    }
    match host.matches(':').count() {
        1 => host.split(':').next().unwrap_or(host),
        _ => host,
    }
}

fn normalize(slug: &str) -> Option<String> {
    let slug = slug.trim().to_ascii_lowercase();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Lowercase letters, digits and inner hyphens; at most one DNS label long.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 63
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config() -> TenancyConfig {
        let mut tenancy = AppConfig::development().tenancy;
        tenancy.base_domain = "hunt.example.com".to_string();
        tenancy.dev_hosts = vec!["preview.internal".to_string()];
        tenancy
    }

    #[test]
    fn subdomain_is_the_slug() {
        let c = config();
        assert_eq!(resolve(&c, Some("zoo.hunt.example.com"), None, None), Some("zoo".to_string()));
        assert_eq!(resolve(&c, Some("Zoo.Hunt.Example.com:443"), None, None), Some("zoo".to_string()));
        assert_eq!(resolve(&c, Some("a.b.hunt.example.com"), None, None), Some("a".to_string()));
    }

    #[test]
    fn bare_and_www_domains_have_no_tenant() {
        let c = config();
        assert_eq!(resolve(&c, Some("hunt.example.com"), None, None), None);
        assert_eq!(resolve(&c, Some("www.hunt.example.com"), None, None), None);
        assert_eq!(resolve(&c, None, Some("zoo"), None), None);
    }

    #[test]
    fn overrides_only_apply_on_dev_hosts() {
        let c = config();
        assert_eq!(resolve(&c, Some("localhost:3000"), Some("zoo"), Some("aquarium")), Some("zoo".to_string()));
        assert_eq!(resolve(&c, Some("127.0.0.1"), None, Some(" Aquarium ")), Some("aquarium".to_string()));
        assert_eq!(resolve(&c, Some("[::1]:8080"), Some("zoo"), None), Some("zoo".to_string()));
        assert_eq!(resolve(&c, Some("::1"), None, Some("zoo")), Some("zoo".to_string()));
        assert_eq!(resolve(&c, Some("preview.internal"), Some("zoo"), None), Some("zoo".to_string()));
        assert_eq!(resolve(&c, Some("localhost"), Some("  "), None), None);
        assert_eq!(resolve(&c, Some("localhost"), None, None), None);
        assert_eq!(resolve(&c, Some("hunt.example.com"), Some("zoo"), Some("zoo")), None);
    }

    #[test]
    fn slug_format() {
        assert!(is_valid_slug("city-zoo"));
        assert!(is_valid_slug("zoo2"));
        assert!(!is_valid_slug("-zoo"));
        assert!(!is_valid_slug("Zoo"));
        assert!(!is_valid_slug("zoo_park"));
        assert!(!is_valid_slug(""));
    }
}
