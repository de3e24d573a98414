//! Property listings domain module.
//!
//! This crate contains the business rules for rental listings, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod property;

pub use filter::{PropertyFilter, PropertyQuery};
pub use property::{NewProperty, Property, PropertyPatch};
