//! Server configuration

use uuid::Uuid;

use crate::cli::CliArgs;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Tenant id applied to requests that do not carry one
    pub default_tenant: Uuid,

    /// Whether permissive CORS is enabled
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8280,
            default_tenant: Uuid::new_v4(),
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Build the server configuration from parsed CLI arguments (which
    /// themselves fall back to environment variables).
    pub fn from_cli(args: &CliArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            default_tenant: args.default_tenant.unwrap_or_else(Uuid::new_v4),
            enable_cors: true,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
