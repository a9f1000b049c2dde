//! # Domain Layer
//!
//! Pure header parsing and signature recovery, no I/O.

pub mod errors;
pub mod header;
pub mod recovery;
