//! Configuração de build do núcleo.
//!
//! Valores fixos em tempo de compilação. Tudo que o assembly externo
//! também precisa conhecer (tamanho de registrador, alinhamento de stack)
//! sai daqui ou de `arch::frame`.

/// Número máximo de harts suportados (tamanho das tabelas por hart).
pub const MP_NUM_CPUS: usize = 4;

/// Hart que executa o boot e inicia os demais.
pub const BOOT_HART: usize = 0;

/// Tamanho da stack de interrupção de cada hart (bytes).
pub const ISR_STACK_SIZE: usize = 2048;

/// Alinhamento de stack exigido pela psABI RISC-V.
pub const STACK_ALIGN: usize = 16;

/// Endereço base da UART 16550 usada pelos logs (QEMU `virt`).
pub const UART0_BASE: usize = 0x1000_0000;

const _: () = assert!(BOOT_HART < MP_NUM_CPUS);
const _: () = assert!(STACK_ALIGN.is_power_of_two());
const _: () = assert!(ISR_STACK_SIZE % STACK_ALIGN == 0);
