pub const SCHEMA: &str = r#"
-- Permission scope catalog
CREATE TABLE IF NOT EXISTS permissions (
    id TEXT PRIMARY KEY,
    scope TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Globally registered, developer-owned extension definitions
CREATE TABLE IF NOT EXISTS extensions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    domain TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL DEFAULT 'basic',
    owner_id TEXT NOT NULL,

    description TEXT,
    logo TEXT,
    api_doc_url TEXT,
    support_email TEXT,
    developer_contact_emails TEXT NOT NULL DEFAULT '[]',  -- JSON list
    authorized_domains TEXT NOT NULL DEFAULT '[]',        -- JSON list of hostnames
    needed_data TEXT NOT NULL DEFAULT '{}',               -- JSON object, opaque
    permissions TEXT NOT NULL DEFAULT '[]',               -- JSON list of scopes

    is_active INTEGER NOT NULL DEFAULT 0,
    is_published INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Per-tenant installation records. Catalog fields are snapshots taken at
-- install time, never live references.
CREATE TABLE IF NOT EXISTS installations (
    id TEXT PRIMARY KEY,
    business_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    extension_id TEXT NOT NULL REFERENCES extensions(id),
    name TEXT NOT NULL,
    domain TEXT NOT NULL,  -- always carries an explicit scheme
    kind TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    permissions TEXT NOT NULL DEFAULT '[]',  -- JSON list of granted scopes
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(business_id, name),
    UNIQUE(business_id, domain)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_installations_business ON installations(business_id);
CREATE INDEX IF NOT EXISTS idx_installations_business_kind ON installations(business_id, kind);
CREATE INDEX IF NOT EXISTS idx_extensions_owner ON extensions(owner_id);
"#;
