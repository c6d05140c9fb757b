mod domain;
mod models;

pub use domain::{domain_host, normalize_domain};
pub use models::{Extension, ExtensionKind, Installation, Permission};
