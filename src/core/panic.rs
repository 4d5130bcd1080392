//! Panic Handler.
//!
//! Só existe no alvo bare-metal: em hosts o panic é o do `std`, e a
//! simulação usa isso para observar caminhos fatais nos testes.
//!
//! # Comportamento
//! 1. Mascara interrupções do hart (evita reentrada via trap).
//! 2. Loga hart e local do panic na serial.
//! 3. Para o hart.

#[cfg(all(target_os = "none", not(test)))]
use crate::arch::{traits::HartOps, Hart};
#[cfg(all(target_os = "none", not(test)))]
use core::panic::PanicInfo;

#[cfg(all(target_os = "none", not(test)))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    let _ = Hart::irq_lock();

    crate::kerror!("================ KERNEL PANIC ================");
    crate::kerror!("(Panic) hart=", Hart::hart_id());

    if let Some(location) = info.location() {
        crate::klog!("        ");
        crate::klog!(location.file());
        crate::klog!(" linha=", location.line());
        crate::knl!();
    }

    // Sem core::fmt no núcleo: a mensagem formatada não é impressa.
    crate::kerror!("==============================================");

    Hart::hang();
}
