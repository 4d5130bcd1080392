//! Multiprocessamento Simétrico (SMP).
//!
//! - `topology`: `HartId`, índice validado de hart.
//! - `percpu`: descritor de CPU por hart.
//! - `bringup`: registro "comece aqui" dos harts secundários.

pub mod bringup;
pub mod percpu;
pub mod topology;

pub use topology::HartId;
