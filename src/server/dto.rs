use serde::Deserialize;

use crate::types::ExtensionKind;

#[derive(Debug, Deserialize)]
pub struct CreateExtensionRequest {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub kind: Option<ExtensionKind>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub api_doc_url: Option<String>,
    #[serde(default)]
    pub support_email: Option<String>,
    #[serde(default)]
    pub developer_contact_emails: Vec<String>,
    #[serde(default)]
    pub authorized_domains: Vec<String>,
    #[serde(default)]
    pub needed_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub scope: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    /// Global catalog name of the extension to install.
    pub extension: String,
    /// Tenant-local name; defaults to the extension's global name.
    #[serde(default)]
    pub name: Option<String>,
    /// Backend domain override for this installation; defaults to the
    /// extension's published domain.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInstalledParams {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub kind: Option<ExtensionKind>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListExtensionsParams {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}
