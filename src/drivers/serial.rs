// =============================================================================
// SERIAL DRIVER - ZERO OVERHEAD
// =============================================================================
//
// Sink dos macros de log (kinfo!, kerror!, ...).
//
// ARQUITETURA:
// - SEM Mutex/Spinlock - Escrita direta no MMIO da UART
// - SEM core::fmt - Apenas strings e valores imediatos
// - SEM alocação
// - SEM interrupções - Não desabilita IRQs
//
// Em RISC-V escreve numa UART NS16550 (QEMU `virt`, config::UART0_BASE)
// através de `volatile::VolatilePtr`. Em hosts (simulação) os bytes são
// descartados: os testes verificam estado, não texto de log.
//
// FUNÇÕES DISPONÍVEIS:
// - emit(byte)       : Envia um byte
// - emit_str(s)      : Envia string
// - emit_hex(v)      : Envia u64 em hexadecimal
// - emit_nl()        : Envia newline (\r\n)
//
// NOTA IMPORTANTE:
// Não há exclusão mútua entre harts. Em SMP as linhas podem se intercalar.
//
// =============================================================================

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
mod uart {
    use crate::config::UART0_BASE;
    use core::ptr::NonNull;
    use volatile::VolatilePtr;

    // Offsets dos registradores da NS16550
    const THR: usize = 0; // Transmit Holding (DLAB=0) / DLL (DLAB=1)
    const IER: usize = 1; // Interrupt Enable (DLAB=0) / DLM (DLAB=1)
    const FCR: usize = 2; // FIFO Control
    const LCR: usize = 3; // Line Control
    const MCR: usize = 4; // Modem Control
    const LSR: usize = 5; // Line Status

    /// Bit 5 do LSR: buffer de transmissão vazio
    const LSR_THRE: u8 = 1 << 5;

    #[inline(always)]
    fn reg(offset: usize) -> VolatilePtr<'static, u8> {
        // SAFETY: UART0_BASE é MMIO fixo do SoC, mapeado identidade no
        // M-mode, e cada registrador tem 1 byte.
        unsafe { VolatilePtr::new(NonNull::new_unchecked((UART0_BASE + offset) as *mut u8)) }
    }

    pub fn init() {
        reg(IER).write(0x00); // Sem interrupções
        reg(LCR).write(0x80); // DLAB
        reg(THR).write(0x03); // Divisor lo = 38400 baud
        reg(IER).write(0x00); // Divisor hi
        reg(LCR).write(0x03); // 8N1
        reg(FCR).write(0xC7); // FIFO habilitado, limpo, 14 bytes
        reg(MCR).write(0x03); // DTR + RTS
    }

    #[inline(always)]
    pub fn put(byte: u8) {
        let lsr = reg(LSR);
        while lsr.read() & LSR_THRE == 0 {
            core::hint::spin_loop();
        }
        reg(THR).write(byte);
    }
}

#[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
mod uart {
    pub fn init() {}

    #[inline(always)]
    pub fn put(_byte: u8) {}
}

// =============================================================================
// FUNÇÕES DE INICIALIZAÇÃO
// =============================================================================

/// Inicializa a UART (38400 baud, 8N1, FIFO habilitado).
///
/// Deve ser chamada uma vez no early-boot, pelo hart de boot.
pub fn init() {
    uart::init();
}

// =============================================================================
// FUNÇÕES DE ESCRITA
// =============================================================================

/// Envia um único byte.
#[inline(always)]
pub fn emit(byte: u8) {
    uart::put(byte);
}

/// Envia uma string.
#[inline(never)]
pub fn emit_str(s: &str) {
    for byte in s.bytes() {
        emit(byte);
    }
}

/// Envia uma nova linha (CRLF).
#[inline(never)]
pub fn emit_nl() {
    emit(b'\r');
    emit(b'\n');
}

/// Envia um valor u64 em formato hexadecimal.
///
/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres)
#[inline(never)]
pub fn emit_hex(value: u64) {
    emit(b'0');
    emit(b'x');
    let mut shift = 60;
    loop {
        emit(nibble_to_ascii(((value >> shift) & 0xF) as u8));
        if shift == 0 {
            break;
        }
        shift -= 4;
    }
}

/// Converte nibble (0-15) para caractere ASCII ('0'-'9', 'A'-'F').
#[inline(always)]
const fn nibble_to_ascii(n: u8) -> u8 {
    if n < 10 {
        b'0' + n
    } else {
        b'A' + (n - 10)
    }
}
