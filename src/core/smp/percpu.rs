//! Descritores de CPU por hart.
//!
//! Uma tabela estática com um `Cpu` por hart, indexada por `HartId`.
//! Nunca é destruída. Cada descritor é mutado só pelo próprio hart, exceto
//! a stack de interrupção, gravada pelo hart que faz o bring-up antes de
//! liberar o alvo.
//!
//! O layout é `repr(C)`: o assembly de entrada de trap lê `nested` e
//! `irq_stack` pelos offsets exportados abaixo.

use crate::config::MP_NUM_CPUS;
use crate::core::smp::topology::HartId;
use core::mem::offset_of;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

#[repr(C)]
pub struct Cpu {
    /// Profundidade de aninhamento de interrupções (0 = contexto de thread).
    nested: AtomicU32,
    /// Id lógico do hart dono.
    id: u32,
    /// Topo da stack de interrupção (0 = ainda não configurada).
    irq_stack: AtomicUsize,
    /// Base da stack de interrupção.
    irq_stack_base: AtomicUsize,
}

impl Cpu {
    const fn new(id: u32) -> Self {
        Self {
            nested: AtomicU32::new(0),
            id,
            irq_stack: AtomicUsize::new(0),
            irq_stack_base: AtomicUsize::new(0),
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub fn nested(&self) -> u32 {
        self.nested.load(Ordering::Relaxed)
    }

    pub fn irq_stack_top(&self) -> usize {
        self.irq_stack.load(Ordering::Acquire)
    }

    pub fn irq_stack_base(&self) -> usize {
        self.irq_stack_base.load(Ordering::Relaxed)
    }

    /// Registra a stack de interrupção. O topo é publicado por último.
    pub(crate) fn set_irq_stack(&self, base: usize, top: usize) {
        self.irq_stack_base.store(base, Ordering::Relaxed);
        self.irq_stack.store(top, Ordering::Release);
    }

    /// Entrada em ISR. Devolve a nova profundidade.
    pub(crate) fn enter_nested(&self) -> u32 {
        self.nested.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Saída de ISR. Devolve a nova profundidade.
    pub(crate) fn exit_nested(&self) -> u32 {
        let previous = self.nested.fetch_sub(1, Ordering::Relaxed);
        if previous == 0 {
            crate::kerror!("(Smp) irq_exit sem irq_enter, hart=", self.id);
            panic!("contador de aninhamento negativo");
        }
        previous - 1
    }

    #[cfg(test)]
    pub(crate) fn reset_nested(&self) {
        self.nested.store(0, Ordering::Relaxed);
    }
}

const fn cpu_table() -> [Cpu; MP_NUM_CPUS] {
    let mut cpus = [const { Cpu::new(0) }; MP_NUM_CPUS];
    let mut i = 0;
    while i < MP_NUM_CPUS {
        cpus[i] = Cpu::new(i as u32);
        i += 1;
    }
    cpus
}

static CPUS: [Cpu; MP_NUM_CPUS] = cpu_table();

/// Descritor do hart que executa a chamada.
///
/// Só lê `mhartid`: pode ser usada em trap e antes do init do hart.
#[inline]
pub fn curr_cpu() -> &'static Cpu {
    &CPUS[HartId::current().index()]
}

/// Descritor de um hart qualquer.
#[inline]
pub fn get(hart: HartId) -> &'static Cpu {
    &CPUS[hart.index()]
}

// Offsets lidos pelo assembly de trap
pub const CPU_NESTED_OFFSET: usize = offset_of!(Cpu, nested);
pub const CPU_IRQ_STACK_OFFSET: usize = offset_of!(Cpu, irq_stack);

const _: () = assert!(CPU_NESTED_OFFSET == 0);

/// `riscv_get_curr_cpu` chamado pelo assembly de trap.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
#[no_mangle]
pub extern "C" fn riscv_get_curr_cpu() -> *const Cpu {
    curr_cpu()
}
