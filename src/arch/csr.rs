//! Bits de CSRs RISC-V usados pelo núcleo.
//!
//! `Mstatus` cobre só os bits de habilitação/privilégio que o trap path
//! toca. `TrapCause` decodifica o `mcause` (bit mais alto = interrupção).

use bitflags::bitflags;

bitflags! {
    /// Bits do `mstatus` relevantes para máscara de interrupção.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mstatus: usize {
        const SIE = 1 << 1;
        const MIE = 1 << 3;
        const SPIE = 1 << 5;
        const MPIE = 1 << 7;
        const SPP = 1 << 8;
        const MPP0 = 1 << 11;
        const MPP1 = 1 << 12;
        /// MPP = 0b11 (trap veio do M-mode)
        const MPP_MACHINE = Self::MPP0.bits() | Self::MPP1.bits();
    }
}

/// Chave devolvida por `irq_lock`: o `mstatus.MIE` anterior ao lock.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqKey(Mstatus);

impl IrqKey {
    /// Chave que reabilita interrupções ao ser usada em `irq_unlock`.
    pub const ENABLED: IrqKey = IrqKey(Mstatus::MIE);

    /// Chave que deixa interrupções mascaradas.
    pub const DISABLED: IrqKey = IrqKey(Mstatus::empty());

    /// Extrai a chave de um `mstatus` lido antes do lock.
    pub const fn from_mstatus(previous: Mstatus) -> Self {
        IrqKey(previous.intersection(Mstatus::MIE))
    }

    pub const fn was_enabled(self) -> bool {
        self.0.contains(Mstatus::MIE)
    }

    /// Bits a serem setados de volta no `mstatus` (`csrs`).
    pub const fn bits(self) -> usize {
        self.0.bits()
    }
}

/// Valor decodificado do `mcause`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapCause(usize);

impl TrapCause {
    const INTERRUPT_BIT: usize = 1 << (usize::BITS - 1);

    // Exceções síncronas
    pub const INSTRUCTION_MISALIGNED: TrapCause = TrapCause::exception(0);
    pub const INSTRUCTION_ACCESS_FAULT: TrapCause = TrapCause::exception(1);
    pub const ILLEGAL_INSTRUCTION: TrapCause = TrapCause::exception(2);
    pub const BREAKPOINT: TrapCause = TrapCause::exception(3);
    pub const LOAD_ACCESS_FAULT: TrapCause = TrapCause::exception(5);
    pub const STORE_ACCESS_FAULT: TrapCause = TrapCause::exception(7);
    pub const ECALL_FROM_U: TrapCause = TrapCause::exception(8);
    pub const ECALL_FROM_S: TrapCause = TrapCause::exception(9);
    pub const ECALL_FROM_M: TrapCause = TrapCause::exception(11);

    // Interrupções
    pub const MACHINE_SOFT: TrapCause = TrapCause::interrupt(3);
    pub const MACHINE_TIMER: TrapCause = TrapCause::interrupt(7);
    pub const MACHINE_EXTERNAL: TrapCause = TrapCause::interrupt(11);

    pub const fn from_bits(raw: usize) -> Self {
        TrapCause(raw)
    }

    pub const fn exception(code: usize) -> Self {
        TrapCause(code & !Self::INTERRUPT_BIT)
    }

    pub const fn interrupt(code: usize) -> Self {
        TrapCause(code | Self::INTERRUPT_BIT)
    }

    pub const fn is_interrupt(self) -> bool {
        self.0 & Self::INTERRUPT_BIT != 0
    }

    pub const fn code(self) -> usize {
        self.0 & !Self::INTERRUPT_BIT
    }

    pub const fn bits(self) -> usize {
        self.0
    }
}
