//! Integration Tests Module
//!
//! End-to-end tests that drive the scanner through scripted histories
//! without a live Solana node.

pub mod manager_lifecycle;
pub mod scan_pipeline;
