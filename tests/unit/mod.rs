//! Unit Tests Module
//!
//! Component-level tests exercised through the public API.
