//! Núcleo independente de plataforma.
//!
//! - `smp`: identidade por hart e bring-up de harts secundários.
//! - `irq`: contagem de aninhamento, trampolim de offload e despacho de traps.
//! - `fatal`: taxonomia de erros fatais e caminho terminal.
//! - `init`: stacks de interrupção e idle.

pub mod logging;

pub mod fatal;
pub mod init;
pub mod irq;
pub mod panic;
pub mod smp;

#[cfg(feature = "self_test")]
pub mod test;

#[cfg(test)]
pub(crate) mod test_support;
