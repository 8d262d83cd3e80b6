pub mod services;

// Re-export key types for convenience
pub use services::{apply_transition, BillingCalculator, DispenserService, Transition};
