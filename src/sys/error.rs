//! # Standard Error Codes (Errno)
//!
//! Códigos de erro das chamadas falíveis do núcleo.
//! Segue a numeração POSIX/Linux, como o resto do kernel.
//!
//! Condições irrecuperáveis não passam por aqui: usam
//! `core::fatal::FatalReason` e nunca retornam.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    EBUSY = 16,  // Device or resource busy
    ENODEV = 19, // No such device
    EINVAL = 22, // Invalid argument
}

impl Errno {
    /// Valor negativo, convenção de retorno para o lado C/assembly.
    pub const fn as_isize(self) -> isize {
        -(self as i32 as isize)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Errno::EBUSY => "EBUSY",
            Errno::ENODEV => "ENODEV",
            Errno::EINVAL => "EINVAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_return_convention() {
        assert_eq!(Errno::EINVAL.as_isize(), -22);
        assert_eq!(Errno::ENODEV.as_isize(), -19);
        assert_eq!(Errno::EBUSY.name(), "EBUSY");
    }
}
