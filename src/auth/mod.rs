mod client;
mod middleware;

pub use client::{IdentityClient, Principal, VerifyError};
pub use middleware::{AuthError, RequireBusiness};
