//! # CodeGrade Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the CodeGrade API server and the evaluator.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Verification of identity-provider access tokens
//! - `billing`: Payment-provider client and webhook signature verification
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod billing;
pub mod db;
pub mod models;

/// Current version of the CodeGrade shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
