//! Definições de sistema.

pub mod error;

pub use error::Errno;
