//! Implementação RISC-V das operações de hart (HAL).
//!
//! Leitura de CSRs via crate `riscv`. Operações que precisam ser uma única
//! instrução (swap atômico do `mstatus`, `ecall`, `wfi`) usam asm inline.
//!
//! # Segurança
//! Assume execução em M-mode.

use crate::arch::csr::{IrqKey, Mstatus};
use crate::arch::traits::cpu::HartOps;
use core::arch::asm;

pub struct RiscvHart;

impl RiscvHart {
    /// Lê o `mcause` do trap corrente.
    #[inline]
    pub fn mcause() -> usize {
        ::riscv::register::mcause::read().bits()
    }
}

impl HartOps for RiscvHart {
    /// Lê o CSR `mhartid`.
    #[inline]
    fn hart_id() -> usize {
        ::riscv::register::mhartid::read()
    }

    /// Limpa `mstatus.MIE` e devolve o valor anterior, numa única instrução
    /// (`csrrc`), para não abrir janela entre leitura e escrita.
    #[inline]
    fn irq_lock() -> IrqKey {
        let previous: usize;
        unsafe {
            asm!(
                "csrrc {0}, mstatus, {1}",
                out(reg) previous,
                in(reg) Mstatus::MIE.bits(),
                options(nostack, preserves_flags),
            );
        }
        IrqKey::from_mstatus(Mstatus::from_bits_retain(previous))
    }

    /// Seta de volta os bits da chave (`csrs`). Chave vazia não muda nada.
    #[inline]
    unsafe fn irq_unlock(key: IrqKey) {
        asm!(
            "csrs mstatus, {0}",
            in(reg) key.bits(),
            options(nostack, preserves_flags),
        );
    }

    #[inline]
    fn irqs_enabled() -> bool {
        ::riscv::register::mstatus::read().mie()
    }

    /// `ecall` em M-mode: trap síncrono com mcause = 11.
    /// Sem `nomem`: o trap path lê o slot de offload escrito antes.
    #[inline]
    fn soft_trap() {
        unsafe {
            asm!("ecall", options(nostack));
        }
    }

    #[inline]
    fn halt() {
        unsafe {
            asm!("wfi", options(nomem, nostack, preserves_flags));
        }
    }
}
