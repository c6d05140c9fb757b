use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capability an extension may request and a tenant may grant, identified
/// by a globally unique scope string such as `"orders.read"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    Basic,
    Ipg,
}

impl ExtensionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::Basic => "basic",
            ExtensionKind::Ipg => "ipg",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ExtensionKind::Basic),
            "ipg" => Ok(ExtensionKind::Ipg),
            other => Err(format!("unknown extension kind: {other}")),
        }
    }
}

/// A developer-owned, globally registered external application definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extension {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub kind: ExtensionKind,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_doc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developer_contact_emails: Vec<String>,
    /// Hostnames the extension has registered for redirects/origins. When
    /// non-empty, installations may only bind to one of these hosts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_domains: Vec<String>,
    /// Declared data requirements, opaque to the registry.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub needed_data: serde_json::Map<String, serde_json::Value>,
    /// Scope strings this extension is allowed to request.
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tenant-scoped binding of an extension to a backend domain and a local
/// name. Fields copied from the catalog are a snapshot taken at install time;
/// later catalog edits do not affect existing installations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    pub id: String,
    pub business_id: String,
    pub user_id: String,
    pub extension_id: String,
    pub name: String,
    pub domain: String,
    pub kind: ExtensionKind,
    pub is_active: bool,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
