//! Domain core for the adpilot campaign backend.
//!
//! Zero-I/O crate: entity types, validation rules, the access-control
//! predicates, campaign lifecycle and metric derivation, query/statistics
//! math, and the traits the outer crates implement (stores, the generation
//! capability, the notifier).

#[macro_use]
mod macros;

pub mod access;
pub mod campaign;
pub mod content;
pub mod error;
pub mod generation;
pub mod notify;
pub mod persona;
pub mod query;
pub mod roles;
pub mod stats;
pub mod store;
pub mod types;
