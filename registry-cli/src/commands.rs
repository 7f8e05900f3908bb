pub mod documents;
pub mod events;
pub mod households;
pub mod log;
pub mod medical;
pub mod qr;
pub mod reports;
pub mod residents;
pub mod seed;
pub mod users;

/// Rendered command output.
pub type Output = serde_json::Value;
