//! Interface Abstrata de Hart (HAL).
//! Define as operações que cada plataforma (RISC-V real ou simulação) implementa.

use crate::arch::csr::IrqKey;

pub trait HartOps {
    /// ID de hardware do hart que executa a chamada (`mhartid`).
    ///
    /// Valor cru: quem precisa de um índice válido usa `HartId::current()`.
    fn hart_id() -> usize;

    /// Mascara interrupções locais e devolve a chave para restaurá-las.
    fn irq_lock() -> IrqKey;

    /// Restaura o estado de interrupções guardado em `key`.
    ///
    /// # Safety
    /// Pode habilitar interrupções e causar entrada imediata em trap.
    /// A chave deve vir do `irq_lock` correspondente neste mesmo hart.
    unsafe fn irq_unlock(key: IrqKey);

    /// Verifica se as interrupções locais estão habilitadas (`mstatus.MIE`).
    fn irqs_enabled() -> bool;

    /// Executa a instrução de trap de software (`ecall`).
    ///
    /// Síncrono: retorna somente depois que o caminho de trap terminou.
    fn soft_trap();

    /// Espera pela próxima interrupção (`wfi`).
    fn halt();

    /// Dica para a CPU que estamos em um spinloop.
    #[inline]
    fn relax() {
        core::hint::spin_loop();
    }

    /// Mascara interrupções e para o hart para sempre.
    /// Usado no caminho fatal.
    fn hang() -> ! {
        let _ = Self::irq_lock();
        loop {
            Self::halt();
        }
    }
}
