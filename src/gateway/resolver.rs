use crate::error::{Error, Result};
use crate::registry::InstallationRegistry;

/// A resolved proxy destination: the normalized backend base URL and the
/// installation-local name used in outbound path reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub base: String,
    pub app: String,
}

/// Maps `(tenant, app_name)` to a forwarding target.
///
/// An inactive installation is treated exactly like a missing one; the two
/// outcomes must stay observably identical so the gateway never reveals
/// whether a name exists in another state or another tenant.
pub fn resolve_route(
    registry: &InstallationRegistry,
    business_id: &str,
    app_name: &str,
) -> Result<RouteTarget> {
    let installation = registry.resolve(business_id, app_name)?;
    if !installation.is_active {
        return Err(Error::NotFound);
    }
    Ok(RouteTarget {
        base: installation.domain,
        app: installation.name,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::store::{SqliteStore, Store};
    use crate::types::{Extension, ExtensionKind};

    fn registry_with_install(active: bool) -> InstallationRegistry {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let now = Utc::now();
        store
            .create_extension(&Extension {
                id: Uuid::new_v4().to_string(),
                name: "billing".to_string(),
                domain: "https://billing.example.com".to_string(),
                kind: ExtensionKind::Basic,
                owner_id: "dev-1".to_string(),
                description: None,
                logo: None,
                api_doc_url: None,
                support_email: None,
                developer_contact_emails: vec![],
                authorized_domains: vec![],
                needed_data: serde_json::Map::new(),
                permissions: vec![],
                is_active: true,
                is_published: true,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let registry = InstallationRegistry::new(Arc::new(store), 50);
        registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap();
        if !active {
            registry.deactivate("t1", "billing").unwrap();
        }
        registry
    }

    #[test]
    fn active_installation_resolves_to_its_domain() {
        let registry = registry_with_install(true);
        let target = resolve_route(&registry, "t1", "billing").unwrap();
        assert_eq!(target.base, "https://billing.example.com");
        assert_eq!(target.app, "billing");
    }

    #[test]
    fn inactive_and_missing_are_indistinguishable() {
        let registry = registry_with_install(false);

        let inactive = resolve_route(&registry, "t1", "billing").unwrap_err();
        let missing = resolve_route(&registry, "t1", "nothere").unwrap_err();
        let foreign = resolve_route(&registry, "t2", "billing").unwrap_err();

        assert!(matches!(inactive, Error::NotFound));
        assert!(matches!(missing, Error::NotFound));
        assert!(matches!(foreign, Error::NotFound));
    }
}
