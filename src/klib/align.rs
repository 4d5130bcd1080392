//! # Funções de Alinhamento de Memória
//!
//! Usadas pelos layouts ABI (tamanho do switch handle, do exception frame)
//! e pela validação de regiões de stack. Todas são `const` para poderem
//! aparecer em asserts de compilação.

/// Alinha um valor para cima ao próximo múltiplo de `align`.
///
/// # Exemplo
/// `align_up(52, 16) -> 64`
#[inline(always)]
pub const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Alinha um valor para baixo ao múltiplo anterior de `align`.
#[inline(always)]
pub const fn align_down(val: usize, align: usize) -> usize {
    val & !(align - 1)
}

/// Verifica se um valor está alinhado a `align`.
#[inline(always)]
pub const fn is_aligned(val: usize, align: usize) -> bool {
    val & (align - 1) == 0
}
