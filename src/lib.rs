//! RvCore: núcleo de arquitetura RISC-V SMP.
//!
//! Ponto central de exportação dos módulos.
//! Três peças formam o núcleo:
//! - `core::smp`: identidade por hart e bring-up de harts secundários.
//! - `core::irq`: trampolim de IRQ offload e despacho de traps.
//! - `arch::frame` / `sched::context`: layouts ABI consumidos pelo assembly.
//!
//! Em alvos RISC-V a crate é `no_std` puro. Em qualquer outro host ela
//! compila contra a simulação `arch::hosted`, que usa `std` para modelar
//! um hart por thread.

#![no_std]

#[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
extern crate std;

// --- Configuração e Definições de Sistema ---
pub mod config; // Constantes de build (número de harts, stacks, alinhamento)
pub mod sys; // Códigos de erro (Errno)

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // HAL (CSRs, exception frame, plataforma)
pub mod drivers; // Saída serial dos logs

// --- Módulos Centrais ---
pub mod core; // Logging, SMP, IRQ offload, caminho fatal
pub mod klib; // Utilitários internos (alinhamento, framework de testes)
pub mod sched; // Layouts de troca de contexto

pub use crate::core::irq::offload::offload;
pub use crate::core::smp::bringup::start_cpu;
pub use crate::core::smp::percpu::curr_cpu;

/// Executa todas as suites de self test no hart atual.
/// Verdadeiro se nenhum caso falhou.
#[cfg(feature = "self_test")]
pub fn run_self_tests() -> bool {
    crate::core::test::run_core_tests().failed == 0
}
