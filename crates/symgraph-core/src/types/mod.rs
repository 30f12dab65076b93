//! # Types
//!
//! Small value types shared by the model and the symbol sources.

pub mod address;

pub use address::Address;
