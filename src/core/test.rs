//! Self tests do núcleo.
//!
//! Rodam no hart de boot, no próprio alvo, antes dos secundários serem
//! liberados. O bring-up é exercitado numa tabela local: publicar na
//! `CPU_INIT` aqui liberaria um hart de verdade.

use crate::arch::frame::{self, ExceptionFrame, REG_SIZE};
use crate::arch::traits::HartOps;
use crate::arch::Hart;
use crate::config::{MP_NUM_CPUS, STACK_ALIGN};
use crate::core::irq::{self, offload};
use crate::core::smp::bringup::{self, BringupTable, StackRegion};
use crate::core::smp::percpu;
use crate::core::smp::topology::HartId;
use crate::klib::test_framework::{run_test_suite, SuiteSummary, TestCase, TestResult};
use crate::sys::Errno;
use core::ffi::c_void;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const SMP_TESTS: &[TestCase] = &[
    TestCase::new("hart_id_bounds", test_hart_id_bounds),
    TestCase::new("curr_cpu_matches_mhartid", test_curr_cpu_matches_mhartid),
    TestCase::new("stack_region_validation", test_stack_region_validation),
    TestCase::new("bringup_local_handoff", test_bringup_local_handoff),
];

const OFFLOAD_TESTS: &[TestCase] = &[
    TestCase::new("offload_runs_in_isr", test_offload_runs_in_isr),
    TestCase::new("offload_restores_irqs", test_offload_restores_irqs),
    TestCase::new("offload_empty_slot", test_offload_empty_slot),
];

const LAYOUT_TESTS: &[TestCase] = &[
    TestCase::new("esf_order", test_esf_order),
    TestCase::new("switch_handle_layout", test_switch_handle_layout),
    TestCase::new("bringup_record_size", test_bringup_record_size),
];

/// Executa todas as suites. Devolve a soma dos resultados.
pub fn run_core_tests() -> SuiteSummary {
    crate::kinfo!("╔════════════════════════════════════════╗");
    crate::kinfo!("║     TESTES DO NÚCLEO RISC-V            ║");
    crate::kinfo!("╚════════════════════════════════════════╝");

    let mut total = SuiteSummary::default();
    for (name, tests) in [
        ("Smp", SMP_TESTS),
        ("Offload", OFFLOAD_TESTS),
        ("Layout", LAYOUT_TESTS),
    ] {
        let summary = run_test_suite(name, tests);
        total.passed += summary.passed;
        total.failed += summary.failed;
        total.skipped += summary.skipped;
    }

    if total.failed == 0 {
        crate::kok!("Núcleo validado");
    } else {
        crate::kfail!("Núcleo com falhas");
    }
    total
}

// =============================================================================
// SMP
// =============================================================================

fn test_hart_id_bounds() -> TestResult {
    if HartId::new(MP_NUM_CPUS).is_some() {
        crate::kerror!("(Smp) HartId aceitou índice fora da tabela");
        return TestResult::Fail;
    }
    if HartId::try_from(MP_NUM_CPUS) != Err(Errno::EINVAL) {
        return TestResult::Fail;
    }
    TestResult::Pass
}

fn test_curr_cpu_matches_mhartid() -> TestResult {
    let cpu = percpu::curr_cpu();
    if cpu.id() as usize != Hart::hart_id() {
        crate::kerror!("(Smp) Descritor errado para mhartid=", Hart::hart_id());
        return TestResult::Fail;
    }
    if !core::ptr::eq(cpu, percpu::curr_cpu()) {
        return TestResult::Fail;
    }
    TestResult::Pass
}

fn test_stack_region_validation() -> TestResult {
    match StackRegion::new(0x8000_0000, 0x1000) {
        Ok(stack) if stack.top() == 0x8000_1000 => {}
        _ => return TestResult::Fail,
    }
    if StackRegion::new(0x8000_0000, 0).is_ok() || StackRegion::new(usize::MAX, 0x10).is_ok() {
        return TestResult::Fail;
    }
    TestResult::Pass
}

extern "C" fn never_entered(_hart: usize, _arg: *mut c_void) {}

fn test_bringup_local_handoff() -> TestResult {
    if MP_NUM_CPUS < 2 {
        return TestResult::Skip;
    }

    let table = BringupTable::new();
    let target = match HartId::new(1) {
        Some(hart) => hart,
        None => return TestResult::Skip,
    };

    if table.record(target).try_take().is_some() {
        return TestResult::Fail;
    }

    let stack = match StackRegion::new(0x8010_0000, 0x2000) {
        Ok(stack) => stack,
        Err(_) => return TestResult::Fail,
    };
    table.start_cpu(target, stack, never_entered, 0x55 as *mut c_void);

    let start = table.wait_for_start(target);
    if start.stack_top != 0x8010_2000 || start.arg as usize != 0x55 {
        crate::kerror!("(Smp) Registro lido diferente do publicado, sp=", start.stack_top);
        return TestResult::Fail;
    }
    TestResult::Pass
}

// =============================================================================
// OFFLOAD
// =============================================================================

static OFFLOAD_RUNS: AtomicUsize = AtomicUsize::new(0);
static OFFLOAD_IN_ISR: AtomicBool = AtomicBool::new(false);
static OFFLOAD_IRQS_ON: AtomicBool = AtomicBool::new(true);

fn offload_probe(param: *mut c_void) {
    OFFLOAD_RUNS.fetch_add(1, Ordering::SeqCst);
    OFFLOAD_IN_ISR.store(irq::is_in_isr(), Ordering::SeqCst);
    OFFLOAD_IRQS_ON.store(Hart::irqs_enabled(), Ordering::SeqCst);
    crate::ktrace!("(Offload) param=", param as usize);
}

fn test_offload_runs_in_isr() -> TestResult {
    let before = OFFLOAD_RUNS.load(Ordering::SeqCst);
    offload::offload(offload_probe, 0xAB as *mut c_void);

    if OFFLOAD_RUNS.load(Ordering::SeqCst) != before + 1 {
        crate::kerror!("(Offload) Rotina não executou exatamente uma vez");
        return TestResult::Fail;
    }
    if !OFFLOAD_IN_ISR.load(Ordering::SeqCst) || OFFLOAD_IRQS_ON.load(Ordering::SeqCst) {
        crate::kerror!("(Offload) Rotina fora de contexto de trap");
        return TestResult::Fail;
    }
    if !offload::slot_is_idle(HartId::current()) || irq::is_in_isr() {
        return TestResult::Fail;
    }
    TestResult::Pass
}

fn test_offload_restores_irqs() -> TestResult {
    let key = Hart::irq_lock();
    offload::offload(offload_probe, core::ptr::null_mut());
    let masked_after = !Hart::irqs_enabled();
    // SAFETY: chave do irq_lock acima.
    unsafe { Hart::irq_unlock(key) };

    if masked_after {
        TestResult::Pass
    } else {
        crate::kerror!("(Offload) offload reabilitou interrupções do chamador");
        TestResult::Fail
    }
}

fn test_offload_empty_slot() -> TestResult {
    let before = OFFLOAD_RUNS.load(Ordering::SeqCst);
    let key = Hart::irq_lock();
    offload::do_offload();
    // SAFETY: chave do irq_lock acima.
    unsafe { Hart::irq_unlock(key) };

    if OFFLOAD_RUNS.load(Ordering::SeqCst) == before && offload::pending_offload().is_none() {
        TestResult::Pass
    } else {
        TestResult::Fail
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

fn test_esf_order() -> TestResult {
    if frame::ESF_MEPC_OFFSET != 18 * REG_SIZE || frame::ESF_MSTATUS_OFFSET != 19 * REG_SIZE {
        crate::kerror!("(Layout) mepc/mstatus fora de ordem, mepc=", frame::ESF_MEPC_OFFSET);
        return TestResult::Fail;
    }
    if frame::ESF_SIZE % STACK_ALIGN != 0 || frame::ESF_SIZE < core::mem::size_of::<ExceptionFrame>() {
        return TestResult::Fail;
    }
    TestResult::Pass
}

#[cfg(feature = "smp")]
fn test_switch_handle_layout() -> TestResult {
    use crate::sched::context::switch::{SWITCH_HDL_SIZE, SWITCH_HDL_SP_OFFSET};

    if SWITCH_HDL_SP_OFFSET != 12 * REG_SIZE {
        crate::kerror!("(Layout) sp do switch handle em ", SWITCH_HDL_SP_OFFSET);
        return TestResult::Fail;
    }
    if SWITCH_HDL_SIZE % STACK_ALIGN != 0 || SWITCH_HDL_SIZE < 13 * REG_SIZE {
        return TestResult::Fail;
    }
    TestResult::Pass
}

#[cfg(not(feature = "smp"))]
fn test_switch_handle_layout() -> TestResult {
    TestResult::Skip
}

fn test_bringup_record_size() -> TestResult {
    if bringup::SMP_CPU_INIT_SIZE == 3 * REG_SIZE {
        TestResult::Pass
    } else {
        TestResult::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_tests_pass_on_the_boot_hart() {
        let _guard = crate::core::test_support::exclusive();
        crate::core::test_support::on_hart(0);

        let summary = run_core_tests();
        assert_eq!(summary.failed, 0);
        assert!(summary.passed >= 9);
    }
}
