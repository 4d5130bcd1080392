//! Apoio aos testes de host.
//!
//! Os harts simulados compartilham estado global (slots de offload,
//! contadores de aninhamento, `MIE`, hook fatal). Testes que tocam esse
//! estado seguram `exclusive()` e começam com `on_hart()`.

use crate::arch::hosted;
use crate::core::irq::offload;
use crate::core::smp::percpu;
use crate::core::smp::topology::HartId;
use spin::{Mutex, MutexGuard};

static LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn exclusive() -> MutexGuard<'static, ()> {
    LOCK.lock()
}

/// Faz a thread atual ser o hart `id`, com o hart em estado de thread:
/// fora de ISR, interrupções habilitadas e slot de offload vazio.
pub(crate) fn on_hart(id: usize) {
    let hart = HartId::new(id).expect("hart de teste fora da tabela");
    hosted::set_current_hart(id);
    hosted::cpu::force_irqs(id, true);
    percpu::get(hart).reset_nested();
    let _ = offload::slot(hart).take();
    crate::core::fatal::set_fatal_hook(None);
}
