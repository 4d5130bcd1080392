//! Estado de troca de contexto por thread.
//!
//! O escalonador genérico fica fora desta crate. Aqui só mora o layout
//! que ele e o assembly de `arch_switch` precisam combinar.

pub mod context;
