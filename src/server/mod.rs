mod dto;
mod extensions;
mod installed;
mod permissions;
mod proxy;
pub mod response;
mod router;

pub use router::{AppState, create_router};
