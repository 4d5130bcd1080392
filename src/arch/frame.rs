//! Exception frame (ESF): layout ABI do trap path.
//!
//! O assembly de entrada de trap (fora desta crate) empilha os registradores
//! exatamente nesta ordem. A mesma memória é relida aqui como
//! `ExceptionFrame`. Qualquer reordenação quebra o binário: os offsets são
//! verificados em tempo de compilação logo abaixo e exportados como
//! constantes para o assembly.
//!
//! Ordem: `ra, gp, tp, t0..t6, a0..a7, mepc, mstatus` e, com a feature
//! `soc_context_save`, o bloco do SoC por último.

use crate::arch::csr::Mstatus;
use crate::config::STACK_ALIGN;
use crate::klib::align_up;
use core::mem::{offset_of, size_of};

/// Registrador de uso geral (XLEN).
pub type Reg = usize;

/// Largura de um registrador em bytes (4 em rv32, 8 em rv64).
pub const REG_SIZE: usize = size_of::<Reg>();

/// Registradores extras salvos por SoCs com extensão própria.
///
/// Layout do RI5CY (PULPino): dois conjuntos de hardware loops.
#[cfg(feature = "soc_context_save")]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocContext {
    pub lpstart0: Reg,
    pub lpend0: Reg,
    pub lpcount0: Reg,
    pub lpstart1: Reg,
    pub lpend1: Reg,
    pub lpcount1: Reg,
}

/// Snapshot do estado do hart na entrada do trap.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExceptionFrame {
    pub ra: Reg, // return address
    pub gp: Reg, // global pointer
    pub tp: Reg, // thread pointer

    // Temporários caller-saved
    pub t0: Reg,
    pub t1: Reg,
    pub t2: Reg,
    pub t3: Reg,
    pub t4: Reg,
    pub t5: Reg,
    pub t6: Reg,

    // Argumentos / retorno
    pub a0: Reg,
    pub a1: Reg,
    pub a2: Reg,
    pub a3: Reg,
    pub a4: Reg,
    pub a5: Reg,
    pub a6: Reg,
    pub a7: Reg,

    pub mepc: Reg,    // PC no momento do trap
    pub mstatus: Reg, // status no momento do trap

    #[cfg(feature = "soc_context_save")]
    pub soc_context: SocContext,
}

/// Padrão usado no frame "fabricado" quando um erro fatal não vem de um trap.
pub const POISON: Reg = 0xdead_baad;

impl ExceptionFrame {
    pub const fn zeroed() -> Self {
        Self::filled(0)
    }

    /// Frame com todos os registradores em `POISON`.
    pub const fn poisoned() -> Self {
        Self::filled(POISON)
    }

    const fn filled(v: Reg) -> Self {
        Self {
            ra: v,
            gp: v,
            tp: v,
            t0: v,
            t1: v,
            t2: v,
            t3: v,
            t4: v,
            t5: v,
            t6: v,
            a0: v,
            a1: v,
            a2: v,
            a3: v,
            a4: v,
            a5: v,
            a6: v,
            a7: v,
            mepc: v,
            mstatus: v,
            #[cfg(feature = "soc_context_save")]
            soc_context: SocContext {
                lpstart0: v,
                lpend0: v,
                lpcount0: v,
                lpstart1: v,
                lpend1: v,
                lpcount1: v,
            },
        }
    }

    /// `mstatus` salvo, decodificado.
    pub const fn status(&self) -> Mstatus {
        Mstatus::from_bits_retain(self.mstatus)
    }

    /// Registradores de argumento `a0..a7`.
    pub const fn args(&self) -> [Reg; 8] {
        [
            self.a0, self.a1, self.a2, self.a3, self.a4, self.a5, self.a6, self.a7,
        ]
    }
}

// =============================================================================
// OFFSETS EXPORTADOS PARA O ASSEMBLY
// =============================================================================

pub const ESF_RA_OFFSET: usize = offset_of!(ExceptionFrame, ra);
pub const ESF_GP_OFFSET: usize = offset_of!(ExceptionFrame, gp);
pub const ESF_TP_OFFSET: usize = offset_of!(ExceptionFrame, tp);
pub const ESF_T0_OFFSET: usize = offset_of!(ExceptionFrame, t0);
pub const ESF_T6_OFFSET: usize = offset_of!(ExceptionFrame, t6);
pub const ESF_A0_OFFSET: usize = offset_of!(ExceptionFrame, a0);
pub const ESF_A7_OFFSET: usize = offset_of!(ExceptionFrame, a7);
pub const ESF_MEPC_OFFSET: usize = offset_of!(ExceptionFrame, mepc);
pub const ESF_MSTATUS_OFFSET: usize = offset_of!(ExceptionFrame, mstatus);

#[cfg(feature = "soc_context_save")]
pub const ESF_SOC_CONTEXT_OFFSET: usize = offset_of!(ExceptionFrame, soc_context);

/// Espaço reservado na stack por trap (frame arredondado para STACK_ALIGN).
pub const ESF_SIZE: usize = align_up(size_of::<ExceptionFrame>(), STACK_ALIGN);

/// Número de registradores do frame base (sem bloco do SoC).
const ESF_BASE_REGS: usize = 20;

const _: () = {
    assert!(ESF_RA_OFFSET == 0);
    assert!(ESF_GP_OFFSET == REG_SIZE);
    assert!(ESF_TP_OFFSET == 2 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, t0) == 3 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, t1) == 4 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, t2) == 5 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, t3) == 6 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, t4) == 7 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, t5) == 8 * REG_SIZE);
    assert!(ESF_T6_OFFSET == 9 * REG_SIZE);
    assert!(ESF_A0_OFFSET == 10 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, a1) == 11 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, a2) == 12 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, a3) == 13 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, a4) == 14 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, a5) == 15 * REG_SIZE);
    assert!(offset_of!(ExceptionFrame, a6) == 16 * REG_SIZE);
    assert!(ESF_A7_OFFSET == 17 * REG_SIZE);
    assert!(ESF_MEPC_OFFSET == 18 * REG_SIZE);
    assert!(ESF_MSTATUS_OFFSET == 19 * REG_SIZE);
    assert!(ESF_SIZE % STACK_ALIGN == 0);
};

#[cfg(not(feature = "soc_context_save"))]
const _: () = assert!(size_of::<ExceptionFrame>() == ESF_BASE_REGS * REG_SIZE);

#[cfg(feature = "soc_context_save")]
const _: () = {
    assert!(ESF_SOC_CONTEXT_OFFSET == ESF_BASE_REGS * REG_SIZE);
    assert!(size_of::<ExceptionFrame>() == (ESF_BASE_REGS + 6) * REG_SIZE);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_follow_push_order() {
        // Preenche cada slot com seu índice, como o assembly faria,
        // e relê pela visão estruturada.
        let mut raw = [0 as Reg; size_of::<ExceptionFrame>() / REG_SIZE];
        for (i, slot) in raw.iter_mut().enumerate() {
            *slot = i;
        }
        // SAFETY: ExceptionFrame é repr(C) composto só de Reg.
        let frame: ExceptionFrame = unsafe { core::mem::transmute(raw) };

        assert_eq!(frame.ra, 0);
        assert_eq!(frame.gp, 1);
        assert_eq!(frame.tp, 2);
        assert_eq!(frame.t0, 3);
        assert_eq!(frame.t6, 9);
        assert_eq!(frame.args(), [10, 11, 12, 13, 14, 15, 16, 17]);
        assert_eq!(frame.mepc, 18);
        assert_eq!(frame.mstatus, 19);
    }

    #[test]
    fn frame_size_is_stack_aligned() {
        assert_eq!(ESF_SIZE % STACK_ALIGN, 0);
        assert!(ESF_SIZE >= size_of::<ExceptionFrame>());
        assert_eq!(ESF_MSTATUS_OFFSET + REG_SIZE, ESF_BASE_REGS * REG_SIZE);
    }

    #[test]
    fn poisoned_frame_marks_every_register() {
        let frame = ExceptionFrame::poisoned();
        assert_eq!(frame.ra, POISON);
        assert_eq!(frame.mepc, POISON);
        assert!(frame.args().iter().all(|&r| r == POISON));
        assert_eq!(ExceptionFrame::zeroed(), ExceptionFrame::default());
    }
}
