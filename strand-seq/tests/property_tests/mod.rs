//! Property-based tests for the backtrackable stores.

pub mod store_properties;
