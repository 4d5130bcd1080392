//! Traits do Hardware Abstraction Layer (HAL).
//! Interfaces públicas que o núcleo usa para falar com o hart.

pub mod cpu;

pub use cpu::HartOps;
