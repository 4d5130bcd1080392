//! Entrada dos harts secundários.
//!
//! O assembly de reset (fora desta crate) coloca cada hart != BOOT_HART numa
//! stack mínima e chama `z_riscv_secondary_start(mhartid)`. O hart fica
//! girando no registro de bring-up até o hart de boot publicar a entrada
//! com `start_cpu`, troca para a stack publicada e salta.

use crate::arch::traits::cpu::HartOps;
use crate::arch::Hart;
use crate::core::smp::bringup::CPU_INIT;
use crate::core::smp::topology::HartId;
use core::arch::asm;

/// Espera a publicação do registro deste hart e transfere o controle.
///
/// `entry(hart, arg)` roda com `sp = stack_base + stack_size`. Se `entry`
/// retornar, o hart para em `wfi`.
///
/// # Safety
/// Deve ser chamado uma única vez por hart, no caminho de reset, com
/// interrupções mascaradas.
pub unsafe fn enter_secondary(hart: HartId) -> ! {
    let start = CPU_INIT.wait_for_start(hart);

    crate::ktrace!("(Smp) Hart liberado, stack top=", start.stack_top);

    asm!(
        "mv sp, {stack_top}",
        "jalr {entry}",
        "2:",
        "wfi",
        "j 2b",
        stack_top = in(reg) start.stack_top,
        entry = in(reg) start.entry as usize,
        in("a0") hart.index(),
        in("a1") start.arg,
        options(noreturn),
    );
}

/// Símbolo chamado pelo assembly de reset para harts secundários.
#[no_mangle]
pub unsafe extern "C" fn z_riscv_secondary_start(hart_id: usize) -> ! {
    match HartId::new(hart_id) {
        Some(hart) => enter_secondary(hart),
        // Hart além de MP_NUM_CPUS: não tem registro nem descritor.
        None => Hart::hang(),
    }
}
