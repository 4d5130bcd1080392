//! Plataforma hospedada: simulação de harts para hosts não-RISC-V.
//!
//! Cada thread do host faz o papel de um hart (`set_current_hart`). O
//! `mstatus.MIE` de cada hart simulado vive numa tabela global, e o trap
//! de software chama o dispatcher do núcleo de forma síncrona, como o
//! hardware faria depois do `ecall`.

pub mod cpu;

pub use cpu::{current_hart, raise_trap, set_current_hart, HostedHart};

/// Hart concreto desta plataforma.
pub type Hart = HostedHart;
