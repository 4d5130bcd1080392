//! Contexto de interrupção.
//!
//! O caminho de trap marca entrada e saída de ISR no descritor do hart
//! (`irq_enter`/`irq_exit`). `is_in_isr` é o que rotinas de offload e
//! handlers usam para saber onde estão.

pub mod offload;
pub mod trap;

use crate::core::smp::percpu::curr_cpu;

#[inline]
pub fn irq_enter() {
    curr_cpu().enter_nested();
}

#[inline]
pub fn irq_exit() {
    curr_cpu().exit_nested();
}

/// Verdadeiro dentro de qualquer trap (offload incluso).
#[inline]
pub fn is_in_isr() -> bool {
    curr_cpu().nested() != 0
}
