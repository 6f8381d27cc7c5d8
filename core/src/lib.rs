//! # Intramural Core
//!
//! Core domain layer for the intramural sports platform backend.
//! This crate holds the verification code entity, the stateless code
//! service (generation and expiration windowing), the ports it is built on
//! (clock, random source, code store, code delivery) and the error types.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
