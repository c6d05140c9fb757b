mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Uniqueness of `(business_id, name)` and `(business_id, domain)` on
/// installations is enforced by the store's unique indexes; `create_installation`
/// is a single atomic insert, never check-then-insert.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Permission catalog operations
    fn create_permission(&self, permission: &Permission) -> Result<()>;
    fn get_permission_by_scope(&self, scope: &str) -> Result<Option<Permission>>;
    fn list_permissions(&self) -> Result<Vec<Permission>>;
    fn delete_permission(&self, scope: &str) -> Result<bool>;

    // Extension catalog operations
    fn create_extension(&self, extension: &Extension) -> Result<()>;
    fn get_extension_by_name(&self, name: &str) -> Result<Option<Extension>>;
    fn list_extensions(&self, offset: i64, limit: i64) -> Result<(Vec<Extension>, i64)>;
    fn set_extension_published(&self, name: &str, published: bool) -> Result<bool>;
    fn set_extension_active(&self, name: &str, active: bool) -> Result<bool>;

    // Installation operations
    fn create_installation(&self, installation: &Installation) -> Result<()>;
    fn get_installation(&self, business_id: &str, name: &str) -> Result<Option<Installation>>;
    /// Combined listing: when `kind` is `None`, the count and items span all
    /// kinds. Count and window share one predicate and one ordering key
    /// (`created_at`, ties broken by `id`) so pagination never skips or
    /// repeats records.
    fn list_installations(
        &self,
        business_id: &str,
        kind: Option<ExtensionKind>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Installation>, i64)>;
    fn set_installation_active(&self, business_id: &str, name: &str, active: bool) -> Result<bool>;
    fn delete_installation(&self, business_id: &str, name: &str) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
