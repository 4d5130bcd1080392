//! Layout de troca de contexto.
//!
//! Com a feature `smp` a troca é feita por `arch_switch(switch_to,
//! switched_from)`, que salva/restaura um `SwitchHandle` (`s0..s11`, depois
//! `sp`). Sem `smp` o swap cooperativo usa `CalleeSaved` (`sp`, depois
//! `s0..s11`) e devolve o resultado do swap em `ThreadArch`.
//!
//! Os offsets são verificados em tempo de compilação e exportados para o
//! assembly.

use crate::arch::frame::{Reg, REG_SIZE};
#[cfg(feature = "smp")]
use crate::config::STACK_ALIGN;
#[cfg(feature = "smp")]
use crate::klib::align_up;
use core::mem::{offset_of, size_of};

// =============================================================================
// SMP: SWITCH HANDLE
// =============================================================================

/// Bloco salvo por `arch_switch`.
///
/// O ponteiro para este bloco é o "switch handle" da thread.
#[cfg(feature = "smp")]
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchHandle {
    pub s0: Reg,
    pub s1: Reg,
    pub s2: Reg,
    pub s3: Reg,
    pub s4: Reg,
    pub s5: Reg,
    pub s6: Reg,
    pub s7: Reg,
    pub s8: Reg,
    pub s9: Reg,
    pub s10: Reg,
    pub s11: Reg,
    pub sp: Reg,
}

#[cfg(feature = "smp")]
impl SwitchHandle {
    pub const fn new() -> Self {
        Self {
            s0: 0,
            s1: 0,
            s2: 0,
            s3: 0,
            s4: 0,
            s5: 0,
            s6: 0,
            s7: 0,
            s8: 0,
            s9: 0,
            s10: 0,
            s11: 0,
            sp: 0,
        }
    }

    /// Handle inicial de uma thread nova: só a stack importa.
    pub const fn with_stack(sp: usize) -> Self {
        let mut handle = Self::new();
        handle.sp = sp;
        handle
    }

    /// Registradores `s0..s11` em ordem.
    pub const fn saved(&self) -> [Reg; 12] {
        [
            self.s0, self.s1, self.s2, self.s3, self.s4, self.s5, self.s6, self.s7, self.s8,
            self.s9, self.s10, self.s11,
        ]
    }
}

#[cfg(feature = "smp")]
pub const SWITCH_HDL_S0_OFFSET: usize = offset_of!(SwitchHandle, s0);
#[cfg(feature = "smp")]
pub const SWITCH_HDL_S11_OFFSET: usize = offset_of!(SwitchHandle, s11);
#[cfg(feature = "smp")]
pub const SWITCH_HDL_SP_OFFSET: usize = offset_of!(SwitchHandle, sp);

/// Espaço do handle, arredondado para `STACK_ALIGN`.
#[cfg(feature = "smp")]
pub const SWITCH_HDL_SIZE: usize = align_up(13 * REG_SIZE, STACK_ALIGN);

#[cfg(feature = "smp")]
const _: () = {
    assert!(SWITCH_HDL_S0_OFFSET == 0);
    assert!(offset_of!(SwitchHandle, s1) == REG_SIZE);
    assert!(offset_of!(SwitchHandle, s2) == 2 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s3) == 3 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s4) == 4 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s5) == 5 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s6) == 6 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s7) == 7 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s8) == 8 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s9) == 9 * REG_SIZE);
    assert!(offset_of!(SwitchHandle, s10) == 10 * REG_SIZE);
    assert!(SWITCH_HDL_S11_OFFSET == 11 * REG_SIZE);
    assert!(SWITCH_HDL_SP_OFFSET == 12 * REG_SIZE);
    assert!(size_of::<SwitchHandle>() == SWITCH_HDL_SIZE);
    assert!(core::mem::align_of::<SwitchHandle>() == STACK_ALIGN);
};

#[cfg(all(feature = "smp", any(target_arch = "riscv32", target_arch = "riscv64")))]
extern "C" {
    /// Salva o contexto atual, publica o handle em `*switched_from` e
    /// restaura `switch_to`. Implementado em assembly fora desta crate.
    pub fn arch_switch(switch_to: *mut core::ffi::c_void, switched_from: *mut *mut core::ffi::c_void);
}

/// Troca para `next`. O handle da thread que sai é gravado em `*prev`.
///
/// # Safety
/// Interrupções mascaradas. `next` aponta para um handle salvo por
/// `arch_switch` ou criado com `with_stack` sobre uma stack exclusiva.
#[cfg(all(feature = "smp", any(target_arch = "riscv32", target_arch = "riscv64")))]
pub unsafe fn switch(next: *mut SwitchHandle, prev: &mut *mut SwitchHandle) {
    arch_switch(next.cast(), (prev as *mut *mut SwitchHandle).cast());
}

// =============================================================================
// SEM SMP: CALLEE-SAVED COOPERATIVO
// =============================================================================

/// Registradores preservados pelo swap cooperativo.
#[cfg(not(feature = "smp"))]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalleeSaved {
    pub sp: Reg,
    pub s0: Reg,
    pub s1: Reg,
    pub s2: Reg,
    pub s3: Reg,
    pub s4: Reg,
    pub s5: Reg,
    pub s6: Reg,
    pub s7: Reg,
    pub s8: Reg,
    pub s9: Reg,
    pub s10: Reg,
    pub s11: Reg,
}

/// Bloco de arquitetura por thread.
#[cfg(not(feature = "smp"))]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadArch {
    /// Valor que `swap` devolve quando a thread volta a rodar.
    pub swap_return_value: u32,
}

#[cfg(not(feature = "smp"))]
impl ThreadArch {
    pub fn set_return_value(&mut self, value: u32) {
        self.swap_return_value = value;
    }
}

#[cfg(not(feature = "smp"))]
pub const CALLEE_SAVED_SP_OFFSET: usize = offset_of!(CalleeSaved, sp);
#[cfg(not(feature = "smp"))]
pub const CALLEE_SAVED_S0_OFFSET: usize = offset_of!(CalleeSaved, s0);
#[cfg(not(feature = "smp"))]
pub const THREAD_ARCH_SWAP_RETURN_OFFSET: usize = offset_of!(ThreadArch, swap_return_value);

#[cfg(not(feature = "smp"))]
const _: () = {
    assert!(CALLEE_SAVED_SP_OFFSET == 0);
    assert!(CALLEE_SAVED_S0_OFFSET == REG_SIZE);
    assert!(offset_of!(CalleeSaved, s11) == 12 * REG_SIZE);
    assert!(size_of::<CalleeSaved>() == 13 * REG_SIZE);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "smp")]
    #[test]
    fn sp_follows_the_twelve_saved_registers() {
        assert_eq!(SWITCH_HDL_SP_OFFSET, 12 * REG_SIZE);
        assert_eq!(SWITCH_HDL_SIZE % STACK_ALIGN, 0);
        assert!(SWITCH_HDL_SIZE >= 13 * REG_SIZE);
        assert!(SWITCH_HDL_SIZE < 13 * REG_SIZE + STACK_ALIGN);
    }

    #[cfg(feature = "smp")]
    #[test]
    fn fresh_handle_only_carries_the_stack() {
        let handle = SwitchHandle::with_stack(0x8020_0000);
        assert_eq!(handle.sp, 0x8020_0000);
        assert!(handle.saved().iter().all(|&r| r == 0));
        assert_eq!(SwitchHandle::new(), SwitchHandle::default());
    }

    #[cfg(not(feature = "smp"))]
    #[test]
    fn cooperative_layout_starts_with_sp() {
        assert_eq!(CALLEE_SAVED_SP_OFFSET, 0);
        assert_eq!(size_of::<CalleeSaved>(), 13 * REG_SIZE);

        let mut arch = ThreadArch::default();
        arch.set_return_value(0xFFFF_FFF5);
        assert_eq!(arch.swap_return_value, 0xFFFF_FFF5);
        assert_eq!(THREAD_ARCH_SWAP_RETURN_OFFSET, 0);
    }
}
