pub mod auth;
pub mod dispensers;
pub mod health;
pub mod telemetry;
