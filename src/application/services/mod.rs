//! Application services

pub mod billing;
mod dispenser;
pub mod ledger;

pub use billing::{BillingCalculator, AMOUNT_SCALE, OPEN_SESSION_AMOUNT, PRICE_PER_SECOND};
pub use dispenser::DispenserService;
pub use ledger::{apply_transition, Transition};
