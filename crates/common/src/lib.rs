//! This crate provides common concepts, types, macros and helpers that the other crates in the
//! harness workspace build on.

pub mod iterators;
pub mod macros;
pub mod types;
