//! Inicialização de arquitetura e idle.
//!
//! Cada hart tem uma stack de interrupção estática de `ISR_STACK_SIZE`
//! bytes. O hart de boot configura a sua em `arch_init`. A dos secundários
//! é configurada por `start_cpu` antes de liberá-los.

use crate::arch::csr::IrqKey;
use crate::arch::traits::HartOps;
use crate::arch::Hart;
use crate::config::{ISR_STACK_SIZE, MP_NUM_CPUS, STACK_ALIGN};
use crate::core::smp::percpu;
use crate::core::smp::topology::HartId;
use core::cell::UnsafeCell;
use core::mem::align_of;

#[repr(C, align(16))]
struct IsrStack([u8; ISR_STACK_SIZE]);

const _: () = assert!(align_of::<IsrStack>() == STACK_ALIGN);

struct IsrStacks(UnsafeCell<[IsrStack; MP_NUM_CPUS]>);

// SAFETY: o núcleo nunca cria referências para o conteúdo. Só endereços
// saem daqui, e cada stack é usada apenas pelo hart dono.
unsafe impl Sync for IsrStacks {}

static ISR_STACKS: IsrStacks =
    IsrStacks(UnsafeCell::new([const { IsrStack([0; ISR_STACK_SIZE]) }; MP_NUM_CPUS]));

/// Configura no descritor de `hart` a stack de interrupção dele.
pub fn init_irq_stack(hart: HartId) {
    let base = (ISR_STACKS.0.get() as *mut IsrStack).wrapping_add(hart.index()) as usize;
    let top = base + ISR_STACK_SIZE;

    percpu::get(hart).set_irq_stack(base, top);
    crate::ktrace!("(Arch) irq stack top=", top);
}

/// Init de arquitetura no hart de boot.
pub fn arch_init() {
    crate::kinfo!("(Arch) Inicializando hart de boot...");
    init_irq_stack(HartId::BOOT);
    crate::kok!("(Arch) Stack de interrupção do hart de boot");
}

/// Habilita interrupções e espera a próxima.
pub fn cpu_idle() {
    // SAFETY: o idle roda em contexto de thread, onde interrupções são
    // esperadas habilitadas.
    unsafe { Hart::irq_unlock(IrqKey::ENABLED) };
    Hart::halt();
}

/// Espera uma interrupção e só então restaura `key`.
///
/// Com `key` vinda de `irq_lock`, não existe janela entre a decisão de
/// dormir e o `wfi` em que uma interrupção seja perdida.
///
/// # Safety
/// Mesmas regras de `HartOps::irq_unlock`.
pub unsafe fn cpu_atomic_idle(key: IrqKey) {
    Hart::halt();
    Hart::irq_unlock(key);
}
