//! Implementação RISC-V (M-mode).

pub mod boot;
pub mod cpu;

pub use cpu::RiscvHart;

/// Hart concreto desta plataforma.
pub type Hart = RiscvHart;
