//! Shared utilities and common types for the ride-dispatch backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic shared by request DTOs in `domain`.

pub mod validation;
