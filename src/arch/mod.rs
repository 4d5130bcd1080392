//! # Hardware Abstraction Layer (HAL)
//!
//! O módulo `arch` é a **única** ponte entre o núcleo (SMP, offload, caminho
//! fatal) e o hart real. CSRs, `ecall`, `wfi` e máscara de interrupções
//! passam por aqui.
//!
//! ## Arquitetura e Fluxo
//! 1. O núcleo importa `crate::arch::Hart`.
//! 2. `Hart` é um *type alias* para a implementação concreta:
//!    - `riscv::RiscvHart` em `riscv32`/`riscv64`;
//!    - `hosted::HostedHart` em qualquer outro alvo (simulação, um hart por thread).
//! 3. O contrato comum é o trait `HartOps`.
//!
//! `csr` e `frame` são independentes de plataforma: descrevem bits e layouts
//! que o assembly de trap também conhece.

pub mod csr;
pub mod frame;
pub mod traits;

// Seleção de Plataforma: RISC-V
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub mod riscv;

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use self::riscv as platform;

// Qualquer outro alvo: simulação hospedada
#[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
pub mod hosted;

#[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
pub use self::hosted as platform;

pub use platform::Hart;
pub use traits::*;
