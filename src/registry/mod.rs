use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ExtensionKind, Installation, domain_host, normalize_domain};

/// The domain service over per-tenant installation records.
///
/// All operations are partitioned by `business_id`; a record belonging to
/// another tenant is indistinguishable from a missing one. Uniqueness is
/// delegated to the store's atomic insert, so concurrent installs of the same
/// `(tenant, name)` race there and exactly one wins.
pub struct InstallationRegistry {
    store: Arc<dyn Store>,
    max_page_size: i64,
}

/// A page of installations plus the size of the full matching set.
#[derive(Debug)]
pub struct InstallationPage {
    pub items: Vec<Installation>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

impl InstallationRegistry {
    pub fn new(store: Arc<dyn Store>, max_page_size: i64) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    /// Installs a published, active extension for a tenant under a local
    /// name. Catalog fields are copied into the record at this point; the
    /// record is a snapshot, not a live reference.
    pub fn install(
        &self,
        business_id: &str,
        user_id: &str,
        extension_name: &str,
        local_name: &str,
        domain: Option<&str>,
        requested_permissions: &[String],
    ) -> Result<Installation> {
        let extension = self
            .store
            .get_extension_by_name(extension_name)?
            .ok_or(Error::NotFound)?;

        // Unpublished or deactivated catalog entries are not installable;
        // their existence is not revealed either way.
        if !extension.is_published || !extension.is_active {
            return Err(Error::NotFound);
        }

        for scope in requested_permissions {
            if !extension.permissions.contains(scope) {
                return Err(Error::PermissionDenied(format!(
                    "scope not declared by extension: {scope}"
                )));
            }
        }

        let domain = normalize_domain(domain.unwrap_or(&extension.domain))?;

        if !extension.authorized_domains.is_empty() {
            let host = domain_host(&domain)
                .ok_or_else(|| Error::InvalidArgument(format!("invalid domain: {domain}")))?;
            if !extension.authorized_domains.contains(&host) {
                return Err(Error::PermissionDenied(format!(
                    "domain not authorized for extension: {host}"
                )));
            }
        }

        let now = Utc::now();
        let installation = Installation {
            id: Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            user_id: user_id.to_string(),
            extension_id: extension.id,
            name: local_name.to_string(),
            domain,
            kind: extension.kind,
            is_active: true,
            permissions: requested_permissions.to_vec(),
            created_at: now,
            updated_at: now,
        };

        self.store.create_installation(&installation)?;
        Ok(installation)
    }

    /// Idempotent: activating an already-active record is a no-op success.
    pub fn activate(&self, business_id: &str, name: &str) -> Result<()> {
        self.set_active(business_id, name, true)
    }

    /// Idempotent: deactivating an already-inactive record is a no-op success.
    pub fn deactivate(&self, business_id: &str, name: &str) -> Result<()> {
        self.set_active(business_id, name, false)
    }

    fn set_active(&self, business_id: &str, name: &str, active: bool) -> Result<()> {
        if self.store.set_installation_active(business_id, name, active)? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    pub fn uninstall(&self, business_id: &str, name: &str) -> Result<()> {
        if self.store.delete_installation(business_id, name)? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Combined cross-kind listing when `kind` is `None`. The limit is
    /// clamped to the configured maximum rather than rejected.
    pub fn list(
        &self,
        business_id: &str,
        kind: Option<ExtensionKind>,
        offset: i64,
        limit: i64,
    ) -> Result<InstallationPage> {
        if offset < 0 {
            return Err(Error::InvalidArgument("offset must not be negative".into()));
        }
        if limit <= 0 {
            return Err(Error::InvalidArgument("limit must be positive".into()));
        }
        let limit = limit.min(self.max_page_size);

        let (items, total) = self
            .store
            .list_installations(business_id, kind, offset, limit)?;
        Ok(InstallationPage {
            items,
            total,
            offset,
            limit,
        })
    }

    /// Exact-match lookup within the tenant partition. Records of other
    /// tenants resolve to `NotFound`, never to a distinguishable state.
    pub fn resolve(&self, business_id: &str, name: &str) -> Result<Installation> {
        self.store
            .get_installation(business_id, name)?
            .ok_or(Error::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::Extension;

    fn registry() -> InstallationRegistry {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        InstallationRegistry::new(Arc::new(store), 50)
    }

    fn seed(registry: &InstallationRegistry, name: &str, scopes: &[&str]) {
        let now = Utc::now();
        registry
            .store
            .create_extension(&Extension {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                domain: format!("https://{name}.example.com"),
                kind: ExtensionKind::Basic,
                owner_id: "dev-1".to_string(),
                description: None,
                logo: None,
                api_doc_url: None,
                support_email: None,
                developer_contact_emails: vec![],
                authorized_domains: vec![],
                needed_data: serde_json::Map::new(),
                permissions: scopes.iter().map(|s| s.to_string()).collect(),
                is_active: true,
                is_published: true,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    #[test]
    fn install_copies_catalog_snapshot_and_starts_active() {
        let registry = registry();
        seed(&registry, "billing", &["orders.read", "orders.write"]);

        let rec = registry
            .install("t1", "u1", "billing", "billing", None, &["orders.read".into()])
            .unwrap();

        assert_eq!(rec.domain, "https://billing.example.com");
        assert_eq!(rec.permissions, vec!["orders.read".to_string()]);
        assert!(rec.is_active);
        assert_eq!(rec.kind, ExtensionKind::Basic);
    }

    #[test]
    fn install_rejects_undeclared_scope() {
        let registry = registry();
        seed(&registry, "billing", &["orders.read", "orders.write"]);

        let err = registry
            .install("t1", "u1", "billing", "billing", None, &["orders.delete".into()])
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[test]
    fn install_normalizes_bare_domain() {
        let registry = registry();
        seed(&registry, "billing", &[]);

        let rec = registry
            .install("t1", "u1", "billing", "pay", Some("ext.example.com"), &[])
            .unwrap();
        assert_eq!(rec.domain, "https://ext.example.com");

        let stored = registry.resolve("t1", "pay").unwrap();
        assert_eq!(stored.domain, "https://ext.example.com");
    }

    #[test]
    fn install_same_name_twice_conflicts() {
        let registry = registry();
        seed(&registry, "billing", &[]);
        seed(&registry, "crm", &[]);

        registry
            .install("t1", "u1", "billing", "apps", None, &[])
            .unwrap();
        let err = registry
            .install("t1", "u1", "crm", "apps", None, &[])
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Tenant-scoped, not global: another tenant reuses the name freely.
        registry
            .install("t2", "u2", "billing", "apps", None, &[])
            .unwrap();
    }

    #[test]
    fn unpublished_or_inactive_extension_is_not_installable() {
        let registry = registry();
        seed(&registry, "billing", &[]);
        registry
            .store
            .set_extension_published("billing", false)
            .unwrap();

        let err = registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));

        registry
            .store
            .set_extension_published("billing", true)
            .unwrap();
        registry.store.set_extension_active("billing", false).unwrap();
        let err = registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn authorized_domains_act_as_install_allow_list() {
        let registry = registry();
        let now = Utc::now();
        registry
            .store
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
                authorized_domains: vec!["billing.example.com".to_string()],
                needed_data: serde_json::Map::new(),
                permissions: vec![],
                is_active: true,
                is_published: true,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap();

        let err = registry
            .install("t2", "u1", "billing", "billing", Some("rogue.example.com"), &[])
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[test]
    fn toggles_are_idempotent() {
        let registry = registry();
        seed(&registry, "billing", &[]);
        registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap();

        registry.deactivate("t1", "billing").unwrap();
        registry.deactivate("t1", "billing").unwrap();
        assert!(!registry.resolve("t1", "billing").unwrap().is_active);

        registry.activate("t1", "billing").unwrap();
        registry.activate("t1", "billing").unwrap();
        assert!(registry.resolve("t1", "billing").unwrap().is_active);

        let err = registry.deactivate("t1", "missing").unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn resolve_is_tenant_partitioned() {
        let registry = registry();
        seed(&registry, "billing", &[]);
        registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap();

        assert!(registry.resolve("t1", "billing").is_ok());
        let err = registry.resolve("t2", "billing").unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn list_validates_and_clamps_pagination() {
        let registry = registry();
        seed(&registry, "billing", &[]);

        assert!(matches!(
            registry.list("t1", None, -1, 10).unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert!(matches!(
            registry.list("t1", None, 0, 0).unwrap_err(),
            Error::InvalidArgument(_)
        ));

        let page = registry.list("t1", None, 0, 10_000).unwrap();
        assert_eq!(page.limit, 50);
    }

    #[test]
    fn uninstall_frees_the_name() {
        let registry = registry();
        seed(&registry, "billing", &[]);

        registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap();
        registry.uninstall("t1", "billing").unwrap();
        assert!(matches!(
            registry.uninstall("t1", "billing").unwrap_err(),
            Error::NotFound
        ));

        registry
            .install("t1", "u1", "billing", "billing", None, &[])
            .unwrap();
    }
}
