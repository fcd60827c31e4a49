// Build-time identity, reported by GET /version and logged at startup

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

pub fn banner() -> String {
    format!("{} v{}", NAME, VERSION)
}
