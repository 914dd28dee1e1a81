//! Error types and error handling for the compiler front end.
//!
//! This module defines the error types shared by every pass. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for scanning, parsing, resolution and checking
//! - The pass classification used by callers to report failures
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
