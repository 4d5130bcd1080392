//! Erros fatais.
//!
//! Todo trap que não é offload nem interrupção de dispositivo termina
//! aqui, assim como `kernel_oops`/`kernel_panic`. Nada aqui retorna: o
//! hart é parado com interrupções mascaradas. Não há política de
//! recuperação.

use crate::arch::frame::ExceptionFrame;
use crate::arch::traits::HartOps;
use crate::arch::Hart;
use spin::Mutex;

/// Motivo de um erro fatal. Os valores são ABI.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalReason {
    CpuException = 0,
    StackCheckFail = 2,
    AllocationFail = 3,
    SpuriousInterrupt = 4,
    KernelOops = 5,
    KernelPanic = 6,
}

impl FatalReason {
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::CpuException),
            2 => Some(Self::StackCheckFail),
            3 => Some(Self::AllocationFail),
            4 => Some(Self::SpuriousInterrupt),
            5 => Some(Self::KernelOops),
            6 => Some(Self::KernelPanic),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CpuException => "Exceção de CPU não tratada",
            Self::StackCheckFail => "Stack check falhou",
            Self::AllocationFail => "Falha de alocação",
            Self::SpuriousInterrupt => "Interrupção espúria",
            Self::KernelOops => "Kernel oops",
            Self::KernelPanic => "Kernel panic",
        }
    }
}

/// Observador chamado antes do hart parar (harness de testes, dumps).
pub type FatalHook = fn(FatalReason, &ExceptionFrame);

static FATAL_HOOK: Mutex<Option<FatalHook>> = Mutex::new(None);

/// Instala (ou remove, com `None`) o observador. Devolve o anterior.
pub fn set_fatal_hook(hook: Option<FatalHook>) -> Option<FatalHook> {
    core::mem::replace(&mut *FATAL_HOOK.lock(), hook)
}

/// Frame usado quando o erro não veio de um trap.
pub static DEFAULT_ESF: ExceptionFrame = ExceptionFrame::poisoned();

/// Reporta o erro fatal e para o hart.
pub fn nano_fatal_error_handler(reason: FatalReason, frame: &ExceptionFrame) -> ! {
    crate::kerror!("(Fatal) ", reason as u32);
    crate::klog!("        ");
    crate::klog!(reason.as_str());
    crate::knl!();
    dump_frame(frame);

    // Copia o hook para fora do lock antes de chamar.
    let hook = *FATAL_HOOK.lock();
    if let Some(hook) = hook {
        hook(reason, frame);
    }

    sys_fatal_error_handler(reason, frame)
}

fn dump_frame(frame: &ExceptionFrame) {
    crate::klog!("  mepc=", frame.mepc, " mstatus=", frame.mstatus);
    crate::knl!();
    crate::klog!("  ra=", frame.ra, " gp=", frame.gp);
    crate::knl!();
    crate::klog!("  tp=", frame.tp, " t0=", frame.t0);
    crate::knl!();
    crate::klog!("  a0=", frame.a0, " a1=", frame.a1);
    crate::knl!();
}

/// Política do sistema para erros fatais: para o hart.
pub fn sys_fatal_error_handler(reason: FatalReason, _frame: &ExceptionFrame) -> ! {
    if reason == FatalReason::KernelPanic {
        crate::kerror!("(Fatal) Kernel panic! Parando o sistema");
    } else {
        crate::kerror!("(Fatal) Hart parado: ", Hart::hart_id());
    }
    Hart::hang()
}

pub fn kernel_oops() -> ! {
    nano_fatal_error_handler(FatalReason::KernelOops, &DEFAULT_ESF)
}

pub fn kernel_panic() -> ! {
    nano_fatal_error_handler(FatalReason::KernelPanic, &DEFAULT_ESF)
}

/// `z_NanoFatalErrorHandler` chamado pelo assembly.
///
/// Motivo desconhecido é tratado como `KernelPanic`. Frame nulo usa
/// `DEFAULT_ESF`.
///
/// # Safety
/// `frame` é nulo ou aponta para um frame válido.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
#[export_name = "z_NanoFatalErrorHandler"]
pub unsafe extern "C" fn nano_fatal_error_handler_c(reason: u32, frame: *const ExceptionFrame) -> ! {
    let reason = match FatalReason::from_raw(reason) {
        Some(reason) => reason,
        None => {
            crate::kerror!("(Fatal) Motivo desconhecido: ", reason);
            FatalReason::KernelPanic
        }
    };
    let frame = frame.as_ref().unwrap_or(&DEFAULT_ESF);
    nano_fatal_error_handler(reason, frame)
}
