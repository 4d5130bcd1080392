//! Despacho de traps.
//!
//! O assembly de entrada empilha o `ExceptionFrame`, troca para a stack de
//! interrupção e chama `z_riscv_trap_dispatch`. A decisão é feita aqui:
//! - interrupção: vai para o dispatcher registrado (controlador de IRQ);
//! - `ecall` em M-mode: passo de despacho do offload, `mepc` avança 4;
//! - qualquer outra exceção: erro fatal.

use crate::arch::csr::TrapCause;
use crate::arch::frame::ExceptionFrame;
use crate::core::fatal::{nano_fatal_error_handler, FatalReason};
use crate::core::irq::{irq_enter, irq_exit, offload};
use crate::sys::Errno;
use spin::Once;

/// Handler de interrupções de dispositivo.
pub type IrqDispatcher = fn(TrapCause, &mut ExceptionFrame);

static IRQ_DISPATCHER: Once<IrqDispatcher> = Once::new();

/// Registra o dispatcher de interrupções. Só pode ser feito uma vez.
pub fn register_irq_dispatcher(dispatcher: IrqDispatcher) -> Result<(), Errno> {
    let mut installed = false;
    IRQ_DISPATCHER.call_once(|| {
        installed = true;
        dispatcher
    });

    if installed {
        Ok(())
    } else {
        crate::kwarn!("(Trap) Dispatcher de IRQ já registrado");
        Err(Errno::EBUSY)
    }
}

/// Trata um trap com causa `cause` e frame `frame`.
pub fn dispatch(cause: TrapCause, frame: &mut ExceptionFrame) {
    route(cause, frame, IRQ_DISPATCHER.get().copied());
}

fn route(cause: TrapCause, frame: &mut ExceptionFrame, irq: Option<IrqDispatcher>) {
    if cause.is_interrupt() {
        match irq {
            Some(handler) => {
                irq_enter();
                handler(cause, frame);
                irq_exit();
            }
            None => {
                crate::kerror!("(Trap) Interrupção sem dispatcher, code=", cause.code());
                nano_fatal_error_handler(FatalReason::SpuriousInterrupt, frame);
            }
        }
        return;
    }

    if cause == TrapCause::ECALL_FROM_M {
        // Retorna para a instrução seguinte ao ecall.
        frame.mepc = frame.mepc.wrapping_add(4);

        irq_enter();
        offload::do_offload();
        irq_exit();
        return;
    }

    crate::kerror!("(Trap) Exceção não tratada, mcause=", cause.bits());
    nano_fatal_error_handler(FatalReason::CpuException, frame);
}

/// Ponto de entrada Rust do assembly de trap.
///
/// # Safety
/// `frame` aponta para o frame recém-empilhado do trap corrente.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
#[no_mangle]
pub unsafe extern "C" fn z_riscv_trap_dispatch(frame: *mut ExceptionFrame) {
    use crate::arch::traits::HartOps;
    use crate::arch::{riscv::RiscvHart, Hart};

    let cause = TrapCause::from_bits(RiscvHart::mcause());
    match frame.as_mut() {
        Some(frame) => dispatch(cause, frame),
        None => {
            crate::kerror!("(Trap) Frame nulo, mcause=", cause.bits());
            Hart::hang();
        }
    }
}
