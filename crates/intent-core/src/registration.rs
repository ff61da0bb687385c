//! Service registration shim
//!
//! Each controller advertises a (host, port) pair derived from environment
//! variables at startup, following the platform convention
//! `<SERVICE_NAME>_SERVICE_HOST` / `<SERVICE_NAME>_SERVICE_PORT` where the
//! service name itself comes from a controller-specific variable with a
//! compiled-in default. Absent or unparsable values fall back to defaults.

use std::env;

/// Compile-time description of a controller's registration contract
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    /// Env var holding the service name (e.g. `HPAPLACEMENT_NAME`)
    pub name_env: &'static str,
    /// Service name used when the env var is unset
    pub default_name: &'static str,
    pub default_host: &'static str,
    pub default_port: u16,
}

/// The resolved advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl ServiceRegistration {
    /// Resolve the advertised endpoint from the current environment
    pub fn resolve(&self) -> ServiceEndpoint {
        let name = read_nonempty(self.name_env).unwrap_or_else(|| self.default_name.to_string());
        let prefix = name.to_uppercase().replace('-', "_");

        let host = read_nonempty(&format!("{prefix}_SERVICE_HOST"))
            .unwrap_or_else(|| self.default_host.to_string());
        let port = read_nonempty(&format!("{prefix}_SERVICE_PORT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.default_port);

        ServiceEndpoint { name, host, port }
    }
}

fn read_nonempty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}
