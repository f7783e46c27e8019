//! # ergo-tests
//!
//! Integration tests for the Ergo appkit.
//!
//! This crate provides:
//! - Generators for boxes, tokens, keys and header chains
//! - An in-memory chain implementing `BlockchainDataSource`
//! - Property-based tests for box selection and transaction assembly
//! - End-to-end send, sign and submit scenarios

pub mod generators;
pub mod harness;

#[cfg(test)]
mod property_tests;


pub use generators::*;
pub use harness::*;
