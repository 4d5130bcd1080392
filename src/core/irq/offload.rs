//! IRQ Offload - executa uma rotina em contexto de trap no próprio hart.
//!
//! `offload(routine, param)`:
//! 1. mascara interrupções locais;
//! 2. arma o slot do hart atual;
//! 3. `ecall`: o trap path chama `do_offload`;
//! 4. `do_offload` esvazia o slot e só depois chama a rotina;
//! 5. restaura as interrupções.
//!
//! O slot é tocado só pelo hart dono, com interrupções mascaradas. Armar
//! de novo antes do consumo sobrescreve (vale o último).

use crate::arch::traits::HartOps;
use crate::arch::Hart;
use crate::config::MP_NUM_CPUS;
use crate::core::smp::topology::HartId;
use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// Rotina executada em contexto de trap.
pub type OffloadRoutine = fn(*mut c_void);

/// Caixa de uma entrada: rotina + parâmetro.
pub struct OffloadSlot {
    routine: AtomicPtr<()>,
    param: AtomicPtr<c_void>,
}

impl OffloadSlot {
    pub const fn new() -> Self {
        Self {
            routine: AtomicPtr::new(ptr::null_mut()),
            param: AtomicPtr::new(ptr::null_mut()),
        }
    }

    pub fn arm(&self, routine: OffloadRoutine, param: *mut c_void) {
        self.param.store(param, Ordering::Relaxed);
        self.routine.store(routine as *mut (), Ordering::Release);
    }

    /// Lê e esvazia o slot numa única operação.
    pub fn take(&self) -> Option<(OffloadRoutine, *mut c_void)> {
        let raw = self.routine.swap(ptr::null_mut(), Ordering::AcqRel);
        if raw.is_null() {
            return None;
        }
        // SAFETY: só `arm` grava valores não nulos, sempre um OffloadRoutine.
        let routine = unsafe { core::mem::transmute::<*mut (), OffloadRoutine>(raw) };
        Some((routine, self.param.load(Ordering::Relaxed)))
    }

    /// Rotina armada, sem consumir.
    pub fn peek(&self) -> Option<OffloadRoutine> {
        let raw = self.routine.load(Ordering::Acquire);
        if raw.is_null() {
            None
        } else {
            // SAFETY: idem `take`.
            Some(unsafe { core::mem::transmute::<*mut (), OffloadRoutine>(raw) })
        }
    }

    pub fn is_idle(&self) -> bool {
        self.routine.load(Ordering::Acquire).is_null()
    }
}

impl Default for OffloadSlot {
    fn default() -> Self {
        Self::new()
    }
}

static SLOTS: [OffloadSlot; MP_NUM_CPUS] = [const { OffloadSlot::new() }; MP_NUM_CPUS];

/// Slot de um hart.
#[inline]
pub fn slot(hart: HartId) -> &'static OffloadSlot {
    &SLOTS[hart.index()]
}

pub fn slot_is_idle(hart: HartId) -> bool {
    slot(hart).is_idle()
}

/// Executa `routine(param)` em contexto de trap neste hart e retorna
/// depois que ela terminou.
///
/// Não pode ser chamada de dentro de uma rotina de offload.
pub fn offload(routine: OffloadRoutine, param: *mut c_void) {
    let key = Hart::irq_lock();

    let hart = HartId::current();
    slot(hart).arm(routine, param);
    crate::ktrace!("(Irq) offload armado, hart=", hart.index());

    Hart::soft_trap();

    // SAFETY: chave do irq_lock acima, no mesmo hart.
    unsafe { Hart::irq_unlock(key) };
}

/// Passo de despacho do trap de software.
///
/// O slot é esvaziado antes da chamada: a rotina pode falhar ou armar de
/// novo sem deixar lixo para trás. Slot vazio não faz nada.
pub fn do_offload() {
    let hart = HartId::current();
    if let Some((routine, param)) = slot(hart).take() {
        routine(param);
    }
}

/// Rotina armada no hart atual e ainda não consumida.
pub fn pending_offload() -> Option<OffloadRoutine> {
    slot(HartId::current()).peek()
}

/// `z_irq_do_offload` chamado pelo assembly de trap no `ecall`.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
#[no_mangle]
pub extern "C" fn z_irq_do_offload() {
    do_offload();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fatal::{self, FatalReason};
    use crate::core::irq::is_in_isr;
    use crate::core::test_support::{exclusive, on_hart};
    use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize};

    static RUNS: AtomicUsize = AtomicUsize::new(0);
    static LAST_PARAM: AtomicUsize = AtomicUsize::new(0);
    static SAW_ISR: AtomicBool = AtomicBool::new(false);
    static SAW_IRQS_ON: AtomicBool = AtomicBool::new(true);
    static SAW_SLOT_IDLE: AtomicBool = AtomicBool::new(false);

    fn probe(param: *mut c_void) {
        RUNS.fetch_add(1, Ordering::SeqCst);
        LAST_PARAM.store(param as usize, Ordering::SeqCst);
        SAW_ISR.store(is_in_isr(), Ordering::SeqCst);
        SAW_IRQS_ON.store(Hart::irqs_enabled(), Ordering::SeqCst);
        SAW_SLOT_IDLE.store(slot_is_idle(HartId::current()), Ordering::SeqCst);
    }

    fn other(_param: *mut c_void) {}

    fn reset_probe() {
        RUNS.store(0, Ordering::SeqCst);
        LAST_PARAM.store(0, Ordering::SeqCst);
        SAW_ISR.store(false, Ordering::SeqCst);
        SAW_IRQS_ON.store(true, Ordering::SeqCst);
        SAW_SLOT_IDLE.store(false, Ordering::SeqCst);
    }

    #[test]
    fn routine_runs_once_in_trap_context() {
        let _guard = exclusive();
        on_hart(0);
        reset_probe();

        offload(probe, 0x42 as *mut c_void);

        // Síncrono: já terminou quando offload retorna.
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        assert_eq!(LAST_PARAM.load(Ordering::SeqCst), 0x42);
        assert!(SAW_ISR.load(Ordering::SeqCst));
        assert!(!SAW_IRQS_ON.load(Ordering::SeqCst));
        assert!(SAW_SLOT_IDLE.load(Ordering::SeqCst));

        assert!(!is_in_isr());
        assert!(Hart::irqs_enabled());
        assert!(slot_is_idle(HartId::BOOT));
        assert!(pending_offload().is_none());
    }

    #[test]
    fn back_to_back_offloads_each_run() {
        let _guard = exclusive();
        on_hart(1);
        reset_probe();

        offload(probe, 0x1 as *mut c_void);
        offload(probe, 0x2 as *mut c_void);

        assert_eq!(RUNS.load(Ordering::SeqCst), 2);
        assert_eq!(LAST_PARAM.load(Ordering::SeqCst), 0x2);
    }

    #[test]
    fn masked_caller_stays_masked() {
        let _guard = exclusive();
        on_hart(0);
        reset_probe();

        let key = Hart::irq_lock();
        offload(probe, ptr::null_mut());
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        assert!(!Hart::irqs_enabled());
        unsafe { Hart::irq_unlock(key) };
        assert!(Hart::irqs_enabled());
    }

    #[test]
    fn empty_slot_dispatch_does_nothing() {
        let _guard = exclusive();
        on_hart(0);
        reset_probe();

        do_offload();
        assert_eq!(RUNS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rearm_before_consumption_keeps_the_last() {
        let slot = OffloadSlot::new();
        assert!(slot.is_idle());

        slot.arm(other, 0x10 as *mut c_void);
        slot.arm(probe, 0x20 as *mut c_void);
        assert_eq!(slot.peek().map(|r| r as usize), Some(probe as usize));

        let (routine, param) = slot.take().unwrap();
        assert_eq!(routine as usize, probe as usize);
        assert_eq!(param as usize, 0x20);
        assert!(slot.take().is_none());
        assert!(slot.is_idle());
    }

    #[test]
    fn pending_offload_peeks_without_consuming() {
        let _guard = exclusive();
        on_hart(0);
        reset_probe();

        slot(HartId::BOOT).arm(probe, ptr::null_mut());
        assert_eq!(pending_offload().map(|r| r as usize), Some(probe as usize));
        assert!(!slot_is_idle(HartId::BOOT));

        do_offload();
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        assert!(pending_offload().is_none());
    }

    static FAULT_REASON: AtomicU32 = AtomicU32::new(u32::MAX);
    static FAULT_SAW_IDLE: AtomicBool = AtomicBool::new(false);

    fn watch_fault(reason: FatalReason, _frame: &crate::arch::frame::ExceptionFrame) {
        FAULT_REASON.store(reason as u32, Ordering::SeqCst);
        FAULT_SAW_IDLE.store(slot_is_idle(HartId::current()), Ordering::SeqCst);
    }

    fn faulting(_param: *mut c_void) {
        fatal::kernel_oops();
    }

    #[test]
    fn slot_is_clear_when_the_routine_faults() {
        let _guard = exclusive();
        on_hart(3);
        fatal::set_fatal_hook(Some(watch_fault));

        let result = std::panic::catch_unwind(|| offload(faulting, ptr::null_mut()));

        assert!(result.is_err());
        assert_eq!(FAULT_REASON.load(Ordering::SeqCst), FatalReason::KernelOops as u32);
        assert!(FAULT_SAW_IDLE.load(Ordering::SeqCst));
        assert!(slot_is_idle(HartId::new(3).unwrap()));

        on_hart(3);
    }
}
