//! Dispenser aggregate

pub mod model;
pub mod repository;

pub use model::Dispenser;
pub use repository::DispenserRepository;
