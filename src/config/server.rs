use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Base URL of the identity provider that validates bearer tokens.
    pub identity_url: String,
    /// API key sent to the identity provider with each verification call.
    pub identity_api_key: String,
    /// Upper bound applied to the `limit` parameter of list endpoints.
    pub max_page_size: i64,
    /// Budget for a single proxied call. Upstream extensions may be slow, so
    /// the default is generous.
    pub proxy_timeout: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("extgate.db")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            identity_url: "https://sso.example.com".to_string(),
            identity_api_key: String::new(),
            max_page_size: 100,
            proxy_timeout: Duration::from_secs(60),
        }
    }
}
