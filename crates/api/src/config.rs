//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `SALES_REP` — sales-rep code stamped on POS postings (default: `"WEB"`)
/// - `OPS_ALERT_ADDRESS` — where reconciliation alerts go
/// - `STAFF_DIRECTORY` — `club=gm-address` pairs, comma separated
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub sales_rep: String,
    pub ops_alert_address: String,
    pub staff_directory: Vec<(u32, String)>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            sales_rep: std::env::var("SALES_REP").unwrap_or_else(|_| "WEB".to_string()),
            ops_alert_address: std::env::var("OPS_ALERT_ADDRESS")
                .unwrap_or_else(|_| "ops@chain.example".to_string()),
            staff_directory: std::env::var("STAFF_DIRECTORY")
                .map(|v| parse_staff_directory(&v))
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            sales_rep: "WEB".to_string(),
            ops_alert_address: "ops@chain.example".to_string(),
            staff_directory: Vec::new(),
        }
    }
}

/// Parses `254=club254gm@chain.example,600=club600gm@chain.example`.
fn parse_staff_directory(raw: &str) -> Vec<(u32, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let (club, address) = entry.trim().split_once('=')?;
            Some((club.trim().parse().ok()?, address.trim().to_string()))
        })
        .collect()
}
