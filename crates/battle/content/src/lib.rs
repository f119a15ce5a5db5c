//! Static battle content: move records and the script factory.
//!
//! Balance data (damage, FP costs, timing windows) lives in RON files
//! embedded at compile time. The loaders turn them into a registry the
//! runtime queries through [`battle_core::MoveOracle`], plus the factory
//! that instantiates the right script for each record.
#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{MoveRegistry, script_for};
