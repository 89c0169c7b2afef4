#![forbid(unsafe_code)]
#![doc = "Common types and error codes for accord."]

pub mod error;

pub use error::*;
