//! Topologia de harts.
//!
//! O `mhartid` é um número de hardware qualquer. Dentro do núcleo só
//! circula `HartId`, que já foi validado contra `MP_NUM_CPUS` e pode
//! indexar as tabelas por hart sem checagem adicional.

use crate::arch::traits::HartOps;
use crate::arch::Hart;
use crate::config::{BOOT_HART, MP_NUM_CPUS};
use crate::sys::Errno;

/// Índice de hart garantidamente menor que `MP_NUM_CPUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HartId(usize);

impl HartId {
    /// Hart que executa o boot.
    pub const BOOT: HartId = HartId(BOOT_HART);

    pub const fn new(raw: usize) -> Option<Self> {
        if raw < MP_NUM_CPUS {
            Some(HartId(raw))
        } else {
            None
        }
    }

    /// Hart que executa a chamada.
    ///
    /// Um `mhartid` fora da tabela é erro de configuração do build,
    /// não condição recuperável: panic (que para o hart).
    pub fn current() -> Self {
        let raw = Hart::hart_id();
        match Self::new(raw) {
            Some(hart) => hart,
            None => {
                crate::kerror!("(Smp) mhartid fora de MP_NUM_CPUS: ", raw);
                panic!("hart id fora da tabela de CPUs");
            }
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Todos os harts configurados, em ordem.
    pub fn all() -> impl Iterator<Item = HartId> {
        (0..MP_NUM_CPUS).map(HartId)
    }
}

impl TryFrom<usize> for HartId {
    type Error = Errno;

    fn try_from(raw: usize) -> Result<Self, Errno> {
        Self::new(raw).ok_or(Errno::EINVAL)
    }
}
