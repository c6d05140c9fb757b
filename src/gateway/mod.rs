mod forwarder;
mod resolver;

pub use forwarder::{ProxyForwarder, ProxyResponse};
pub use resolver::{RouteTarget, resolve_route};
