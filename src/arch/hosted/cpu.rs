//! Hart simulado.

use crate::arch::csr::{IrqKey, Mstatus, TrapCause};
use crate::arch::frame::ExceptionFrame;
use crate::arch::traits::cpu::HartOps;
use crate::config::{BOOT_HART, MP_NUM_CPUS};
use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

std::thread_local! {
    static CURRENT_HART: Cell<usize> = const { Cell::new(BOOT_HART) };
}

/// `mstatus.MIE` de cada hart simulado. Começa habilitado (contexto de thread).
static MIE: [AtomicBool; MP_NUM_CPUS] = [const { AtomicBool::new(true) }; MP_NUM_CPUS];

/// Faz a thread atual se comportar como o hart `id`.
///
/// Não valida `id`: valores fora da tabela simulam um `mhartid` inesperado.
pub fn set_current_hart(id: usize) {
    CURRENT_HART.with(|h| h.set(id));
}

pub fn current_hart() -> usize {
    CURRENT_HART.with(|h| h.get())
}

fn mie_of_current() -> &'static AtomicBool {
    let id = current_hart();
    match MIE.get(id) {
        Some(mie) => mie,
        None => panic!("(Hosted) hart simulado fora da tabela"),
    }
}

/// Simula a entrada de um trap com `cause` no hart atual.
///
/// Como o hardware: `MIE` vai para `MPIE` e é limpo durante o trap, e é
/// restaurado no `mret`. O frame é montado aqui já que não há assembly.
pub fn raise_trap(cause: TrapCause) {
    let mie = mie_of_current();
    let was_enabled = mie.swap(false, Ordering::AcqRel);
    // `mret` simulado. Também roda no unwind de um `hang()`, deixando o
    // hart limpo para o próximo teste.
    let _mret = MretGuard { mie, was_enabled };

    let mut status = Mstatus::MPP_MACHINE;
    if was_enabled {
        status |= Mstatus::MPIE;
    }

    let mut frame = ExceptionFrame::zeroed();
    frame.mepc = raise_trap as usize;
    frame.mstatus = status.bits();

    crate::core::irq::trap::dispatch(cause, &mut frame);
}

struct MretGuard {
    mie: &'static AtomicBool,
    was_enabled: bool,
}

impl Drop for MretGuard {
    fn drop(&mut self) {
        self.mie.store(self.was_enabled, Ordering::Release);
    }
}

/// Força o `mstatus.MIE` do hart `id` (testes que deixam o hart sujo).
#[cfg(test)]
pub(crate) fn force_irqs(id: usize, enabled: bool) {
    MIE[id].store(enabled, Ordering::Release);
}

pub struct HostedHart;

impl HartOps for HostedHart {
    fn hart_id() -> usize {
        current_hart()
    }

    fn irq_lock() -> IrqKey {
        let previous = mie_of_current().swap(false, Ordering::AcqRel);
        if previous {
            IrqKey::ENABLED
        } else {
            IrqKey::DISABLED
        }
    }

    unsafe fn irq_unlock(key: IrqKey) {
        if key.was_enabled() {
            mie_of_current().store(true, Ordering::Release);
        }
    }

    fn irqs_enabled() -> bool {
        mie_of_current().load(Ordering::Acquire)
    }

    fn soft_trap() {
        raise_trap(TrapCause::ECALL_FROM_M);
    }

    fn halt() {
        std::thread::yield_now();
    }

    /// Um hart simulado não pode travar a thread de teste: o "halt
    /// definitivo" vira um panic, observável com `catch_unwind`.
    fn hang() -> ! {
        let _ = Self::irq_lock();
        panic!("(Hosted) hart parado");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_lock_nests_and_restores() {
        let _guard = crate::core::test_support::exclusive();
        crate::core::test_support::on_hart(1);

        assert!(HostedHart::irqs_enabled());
        let outer = HostedHart::irq_lock();
        assert!(!HostedHart::irqs_enabled());
        let inner = HostedHart::irq_lock();
        assert!(!inner.was_enabled());

        unsafe { HostedHart::irq_unlock(inner) };
        assert!(!HostedHart::irqs_enabled());
        unsafe { HostedHart::irq_unlock(outer) };
        assert!(HostedHart::irqs_enabled());
    }

    #[test]
    fn trap_masks_and_mret_restores() {
        let _guard = crate::core::test_support::exclusive();
        crate::core::test_support::on_hart(1);

        // Slot vazio: o ecall só entra e sai do trap.
        raise_trap(TrapCause::ECALL_FROM_M);
        assert!(HostedHart::irqs_enabled());

        let key = HostedHart::irq_lock();
        HostedHart::soft_trap();
        assert!(!HostedHart::irqs_enabled());
        unsafe { HostedHart::irq_unlock(key) };
    }

    #[test]
    fn threads_default_to_the_boot_hart() {
        let id = std::thread::spawn(HostedHart::hart_id).join().unwrap();
        assert_eq!(id, BOOT_HART);
    }
}
