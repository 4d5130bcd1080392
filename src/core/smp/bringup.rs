//! CPU Bring-up - Inicialização de harts secundários.
//!
//! Cada hart != BOOT_HART sai do reset girando no seu `BringupRecord`. O
//! hart que faz o bring-up escreve stack e argumento e, por último, a
//! função de entrada com `Release`. O alvo lê a entrada com `Acquire` até
//! ela deixar de ser nula: a partir daí stack e argumento também são
//! visíveis.
//!
//! O registro não é zerado depois de consumido. Iniciar duas vezes o mesmo
//! hart é erro do chamador e não é sinalizado.

use crate::arch::frame::REG_SIZE;
use crate::arch::traits::HartOps;
use crate::arch::Hart;
use crate::config::{MP_NUM_CPUS, STACK_ALIGN};
use crate::core::smp::topology::HartId;
use crate::klib::is_aligned;
use crate::sys::Errno;
use core::ffi::c_void;
use core::mem::size_of;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Função de entrada de um hart secundário: `entry(hart, arg)`.
pub type CpuStartFn = extern "C" fn(hart: usize, arg: *mut c_void);

/// Registro "comece aqui" de um hart.
///
/// Layout `fn, arg, sp` (3 registradores), polled direto pelo assembly.
#[repr(C)]
pub struct BringupRecord {
    entry: AtomicPtr<()>,
    arg: AtomicPtr<c_void>,
    sp: AtomicUsize,
}

/// Tamanho de um registro, usado pelo assembly para indexar a tabela.
pub const SMP_CPU_INIT_SIZE: usize = size_of::<BringupRecord>();

const _: () = assert!(SMP_CPU_INIT_SIZE == 3 * REG_SIZE);

/// O que o alvo recebe ao ser liberado.
#[derive(Debug, Clone, Copy)]
pub struct StartInfo {
    pub entry: CpuStartFn,
    pub arg: *mut c_void,
    pub stack_top: usize,
}

impl BringupRecord {
    pub const fn new() -> Self {
        Self {
            entry: AtomicPtr::new(ptr::null_mut()),
            arg: AtomicPtr::new(ptr::null_mut()),
            sp: AtomicUsize::new(0),
        }
    }

    /// Publica o registro. A entrada é escrita por último.
    pub fn publish(&self, entry: CpuStartFn, arg: *mut c_void, stack_top: usize) {
        self.sp.store(stack_top, Ordering::Relaxed);
        self.arg.store(arg, Ordering::Relaxed);
        self.entry.store(entry as *mut (), Ordering::Release);
    }

    pub fn is_published(&self) -> bool {
        !self.entry.load(Ordering::Acquire).is_null()
    }

    /// Lê o registro se já foi publicado.
    pub fn try_take(&self) -> Option<StartInfo> {
        let raw = self.entry.load(Ordering::Acquire);
        if raw.is_null() {
            return None;
        }

        // SAFETY: o único valor não nulo gravado em `entry` vem de um
        // `CpuStartFn` em `publish`.
        let entry = unsafe { core::mem::transmute::<*mut (), CpuStartFn>(raw) };

        Some(StartInfo {
            entry,
            arg: self.arg.load(Ordering::Relaxed),
            stack_top: self.sp.load(Ordering::Relaxed),
        })
    }

    /// Gira até o registro ser publicado.
    pub fn wait(&self) -> StartInfo {
        loop {
            if let Some(start) = self.try_take() {
                return start;
            }
            Hart::relax();
        }
    }
}

impl Default for BringupRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Região de stack inicial de um hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRegion {
    base: usize,
    size: usize,
}

impl StackRegion {
    /// Valida `[base, base + size)`: tamanho não nulo, sem overflow e topo
    /// alinhado a `STACK_ALIGN`.
    pub fn new(base: usize, size: usize) -> Result<Self, Errno> {
        if size == 0 {
            return Err(Errno::EINVAL);
        }
        let top = base.checked_add(size).ok_or(Errno::EINVAL)?;
        if !is_aligned(top, STACK_ALIGN) {
            return Err(Errno::EINVAL);
        }
        Ok(Self { base, size })
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    /// Stack cresce para baixo: o hart começa no fim da região.
    pub const fn top(&self) -> usize {
        self.base + self.size
    }
}

/// Um registro por hart.
#[repr(transparent)]
pub struct BringupTable([BringupRecord; MP_NUM_CPUS]);

impl BringupTable {
    pub const fn new() -> Self {
        Self([const { BringupRecord::new() }; MP_NUM_CPUS])
    }

    pub fn record(&self, hart: HartId) -> &BringupRecord {
        &self.0[hart.index()]
    }

    /// Lado do hart que inicia: publica entrada, argumento e stack.
    pub fn start_cpu(&self, hart: HartId, stack: StackRegion, entry: CpuStartFn, arg: *mut c_void) {
        let record = self.record(hart);
        if record.is_published() {
            crate::kwarn!("(Smp) Registro de bring-up republicado, hart=", hart.index());
        }
        record.publish(entry, arg, stack.top());
    }

    /// Lado do alvo: gira até a publicação e devolve o que foi publicado.
    pub fn wait_for_start(&self, hart: HartId) -> StartInfo {
        self.record(hart).wait()
    }
}

impl Default for BringupTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Tabela global, lida pelo caminho de reset dos harts secundários.
#[no_mangle]
pub static CPU_INIT: BringupTable = BringupTable::new();

/// Libera o hart `hart` para executar `entry(hart, arg)` com a stack
/// `[stack_base, stack_base + stack_size)`.
///
/// A stack de interrupção do alvo é configurada antes da publicação.
pub fn start_cpu(
    hart: HartId,
    stack_base: usize,
    stack_size: usize,
    entry: CpuStartFn,
    arg: *mut c_void,
) -> Result<(), Errno> {
    let stack = match StackRegion::new(stack_base, stack_size) {
        Ok(stack) => stack,
        Err(e) => {
            crate::kerror!("(Smp) Stack inválida para bring-up, base=", stack_base);
            return Err(e);
        }
    };

    crate::core::init::init_irq_stack(hart);

    crate::kinfo!("(Smp) Liberando hart ", hart.index());
    crate::ktrace!("(Smp) stack top=", stack.top());

    CPU_INIT.start_cpu(hart, stack, entry, arg);
    Ok(())
}
