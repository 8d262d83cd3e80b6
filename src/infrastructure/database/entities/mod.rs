//! Database entities module

pub mod dispenser;
pub mod usage_session;

pub use dispenser::Entity as Dispenser;
pub use usage_session::Entity as UsageSession;
