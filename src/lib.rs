//! Solana Token Burn History Scanner
//!

pub mod cli;
pub mod config;
pub mod errors;
pub mod rpc;
pub mod scanner;
pub mod supply;
pub mod utils;
