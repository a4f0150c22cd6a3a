pub mod client;
pub mod date;
pub mod de;
pub mod decimal;
pub mod errors;
pub mod payroll;
pub mod percent;
pub mod session;
pub mod statistics;

/// Label used for missing string dimensions.
pub const UNKNOWN: &str = "Unknown";
