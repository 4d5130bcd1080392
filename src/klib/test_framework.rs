//! Framework de self tests do núcleo.
//!
//! Roda no próprio alvo (sem harness do `cargo test`), com o resultado
//! reportado pelos macros de log.

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Contagem final de uma suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Executa suite de testes
pub fn run_test_suite(name: &str, tests: &[TestCase]) -> SuiteSummary {
    crate::kinfo!("=== Executando suite: ");
    crate::klog!(name);
    crate::knl!();

    let mut summary = SuiteSummary::default();

    for test in tests {
        match (test.func)() {
            TestResult::Pass => {
                crate::kok!(test.name);
                summary.passed += 1;
            }
            TestResult::Fail => {
                crate::kfail!(test.name);
                summary.failed += 1;
            }
            TestResult::Skip => {
                crate::kwarn!("[SKIP] ");
                crate::klog!(test.name);
                crate::knl!();
                summary.skipped += 1;
            }
        }
    }

    crate::kinfo!("Resultados: passed=", summary.passed);
    if summary.failed != 0 {
        crate::kerror!("Resultados: failed=", summary.failed);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok() -> TestResult {
        TestResult::Pass
    }

    fn broken() -> TestResult {
        TestResult::Fail
    }

    fn later() -> TestResult {
        TestResult::Skip
    }

    #[test]
    fn summary_counts_each_outcome() {
        const CASES: &[TestCase] = &[
            TestCase::new("ok", ok),
            TestCase::new("ok_again", ok),
            TestCase::new("broken", broken),
            TestCase::new("later", later),
        ];

        let summary = run_test_suite("Framework", CASES);
        assert_eq!(
            summary,
            SuiteSummary {
                passed: 2,
                failed: 1,
                skipped: 1
            }
        );
    }
}
