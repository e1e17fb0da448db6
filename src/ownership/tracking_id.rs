//! Argo CD tracking-id annotation parsing
//!
//! Current format: `<app-identifier>:<group>/<kind>:<namespace>/<name>`, where the
//! app identifier is the Application name, optionally prefixed with its
//! namespace and a dot. Older format: `<app-namespace>:<app-name>`.

/// Owning Application resolved from a tracking id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedApp {
    pub name: String,
    pub namespace: String,
}

/// Parse a tracking-id annotation value
///
/// Returns `None` when the value has no usable app identifier.
///
/// The dotted `<namespace>.<app>` prefix cannot be told apart from an app name
/// that itself contains a dot, so the whole prefix is kept as the name and the
/// namespace is `default_namespace`.
pub fn parse_tracking_id(value: &str, default_namespace: &str) -> Option<TrackedApp> {
    let (first, rest) = value.split_once(':')?;
    if first.is_empty() {
        return None;
    }

    if rest.contains('/') {
        return Some(TrackedApp {
            name: first.to_string(),
            namespace: default_namespace.to_string(),
        });
    }

    // Older `<namespace>:<name>` form
    let name = rest.split(':').next().unwrap_or("");
    if name.is_empty() {
        return None;
    }
    Some(TrackedApp {
        name: name.to_string(),
        namespace: first.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_format_keeps_dotted_identifier() {
        let app =
            parse_tracking_id("example.guestbook:apps/Deployment:guestbook/guestbook-ui", "argocd")
                .unwrap();
        assert_eq!(app.name, "example.guestbook");
        assert_eq!(app.namespace, "argocd");
    }

    #[test]
    fn test_full_format_core_group() {
        let app = parse_tracking_id("guestbook:/Service:guestbook/guestbook-ui", "argocd").unwrap();
        assert_eq!(app.name, "guestbook");
    }

    #[test]
    fn test_legacy_format() {
        let app = parse_tracking_id("argocd-apps:guestbook", "argocd").unwrap();
        assert_eq!(app.name, "guestbook");
        assert_eq!(app.namespace, "argocd-apps");
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_tracking_id("guestbook", "argocd"), None);
        assert_eq!(parse_tracking_id(":apps/Deployment:a/b", "argocd"), None);
        assert_eq!(parse_tracking_id("ns:", "argocd"), None);
    }
}
