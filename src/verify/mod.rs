//! Result verification against the golden reference.
//!
//! After simulation each case directory `random/test_<i>/` holds the
//! array's output dump `output_mem.hex` next to the golden images written by
//! the generator. The verifier destaggers the dump, compares it element-wise
//! with the golden matrix and writes a graded summary.
//!
//! A case whose directory or result file is missing is reported as
//! UNSUCCESSFUL and does not stop the run.

pub mod reader;

pub use reader::{read_golden, read_memory_matrix, read_output_mem};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::codec::FieldFormat;
use crate::error::{Error, Result};
use crate::generator::{case_dir, files, CaseManifest, TileDims, HEX_COLUMN_ORDER};
use crate::matrix::Matrix;

/// File name of the summary log.
pub const SUMMARY_LOG: &str = "verif_summary.log";

/// Which golden matrix the hardware output is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareTarget {
    /// `A x B`.
    #[default]
    Result,
    /// `A x B + P`.
    Accum,
}

impl CompareTarget {
    /// Golden file for this target inside a case directory.
    pub fn golden_file(&self) -> &'static str {
        match self {
            CompareTarget::Result => files::OUTPUT_GOLDEN,
            CompareTarget::Accum => files::ACCUM_GOLDEN,
        }
    }
}

impl FromStr for CompareTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "result" => Ok(CompareTarget::Result),
            "accum" => Ok(CompareTarget::Accum),
            other => Err(Error::Config(format!(
                "unknown compare target {:?} (expected result or accum)",
                other
            ))),
        }
    }
}

/// Outcome of verifying one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Output matches the golden matrix exactly.
    Passed,
    /// Output was read but differs.
    Failed {
        mismatches: usize,
        /// Description of the first differing element.
        first: String,
    },
    /// Case could not be checked (missing directory or file, unreadable dump).
    Unsuccessful { reason: String },
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseOutcome::Passed => write!(f, "PASSED"),
            CaseOutcome::Failed { .. } => write!(f, "FAILED"),
            CaseOutcome::Unsuccessful { .. } => write!(f, "UNSUCCESSFUL"),
        }
    }
}

/// Counts over a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub unsuccessful: usize,
}

impl SuiteResult {
    /// Pass rate as a percentage.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// True when every case passed.
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Verifies a directory of generated cases.
pub struct Verifier {
    base: PathBuf,
    num_tests: usize,
    target: CompareTarget,
    dump_format: FieldFormat,
    results: Vec<(usize, CaseOutcome)>,
}

impl Verifier {
    /// Verify cases `0..num_tests` under `base`.
    pub fn new(base: impl AsRef<Path>, num_tests: usize) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            num_tests,
            target: CompareTarget::default(),
            dump_format: FieldFormat::Hex,
            results: Vec::new(),
        }
    }

    /// Compare against a different golden matrix.
    pub fn with_target(mut self, target: CompareTarget) -> Self {
        self.target = target;
        self
    }

    /// Radix of the hardware dump (`$writememh` or `$writememb`). Golden
    /// images are always hex.
    pub fn with_dump_format(mut self, format: FieldFormat) -> Self {
        self.dump_format = format;
        self
    }

    /// Check every case and return the counts.
    pub fn run_all(&mut self) -> SuiteResult {
        self.results.clear();
        let mut passed = 0;
        let mut failed = 0;
        let mut unsuccessful = 0;

        for index in 0..self.num_tests {
            let outcome = self.run_single(index);
            match &outcome {
                CaseOutcome::Passed => passed += 1,
                CaseOutcome::Failed { mismatches, first } => {
                    log::warn!("Test {}: {} mismatches, first {}", index, mismatches, first);
                    failed += 1;
                }
                CaseOutcome::Unsuccessful { reason } => {
                    log::warn!("Test {}: {}", index, reason);
                    unsuccessful += 1;
                }
            }
            self.results.push((index, outcome));
        }

        let result = SuiteResult {
            total: self.num_tests,
            passed,
            failed,
            unsuccessful,
        };
        log::info!(
            "Verified {} cases: {} passed, {} failed, {} unsuccessful",
            result.total,
            result.passed,
            result.failed,
            result.unsuccessful
        );
        result
    }

    /// Check one case.
    pub fn run_single(&self, index: usize) -> CaseOutcome {
        let dir = case_dir(&self.base, index);
        if !dir.exists() {
            return CaseOutcome::Unsuccessful {
                reason: format!("results do not exist on path: {}", dir.display()),
            };
        }

        match self.compare(&dir) {
            Ok((golden, output)) => match output.first_difference(&golden) {
                None => {
                    log::debug!("Test {}: PASSED", index);
                    CaseOutcome::Passed
                }
                Some((row, col, actual, expected)) => CaseOutcome::Failed {
                    mismatches: output.count_differences(&golden),
                    first: Error::Mismatch {
                        row,
                        col,
                        expected,
                        actual,
                    }
                    .to_string(),
                },
            },
            Err(e) => CaseOutcome::Unsuccessful { reason: e.to_string() },
        }
    }

    /// Load `(golden, output)` for the case in `dir`.
    fn compare(&self, dir: &Path) -> Result<(Matrix, Matrix)> {
        let manifest = CaseManifest::from_file(&dir.join(files::CASE_MANIFEST))?;
        let sat = manifest.format()?;
        let dims = TileDims {
            t: manifest.t,
            k: manifest.k,
            n: manifest.n,
        };
        dims.check(dims.k, dims.n)?;

        let golden = read_golden(
            &dir.join(self.target.golden_file()),
            dims.t,
            dims.n,
            sat,
            HEX_COLUMN_ORDER,
        )?;
        let output = read_output_mem(
            &dir.join(files::OUTPUT_MEM),
            dims.t,
            dims.n,
            sat,
            self.dump_format,
            HEX_COLUMN_ORDER,
        )?;
        Ok((golden, output))
    }

    /// Per-case outcomes of the last run.
    pub fn results(&self) -> &[(usize, CaseOutcome)] {
        &self.results
    }

    /// Render the summary log.
    pub fn summary_report(&self, result: &SuiteResult) -> String {
        let mut report = String::new();

        report.push_str("----- Summary -----\n");
        report.push_str(&format!("Total Tests: {}\n", result.total));
        report.push_str(&format!("Passed Tests: {}\n", result.passed));
        report.push_str(&format!("Grade: {:.2}\n", result.pass_rate()));
        report.push_str("\n----- Results -----\n");
        for (index, outcome) in &self.results {
            report.push_str(&format!("Test {}: {}\n", index, outcome));
        }

        report
    }

    /// Write the summary log to `path`.
    pub fn write_summary(&self, path: &Path, result: &SuiteResult) -> Result<()> {
        std::fs::write(path, self.summary_report(result))?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Saturation;
    use crate::config::Config;
    use crate::generator::VectorGenerator;
    use crate::codec::encode_row;
    use crate::matrix::stagger;
    use std::fs;

    fn generate(dir: &Path, num_tests: usize) {
        let config = Config {
            num_tests: Some(num_tests),
            max_k: Some(2),
            max_n: Some(2),
            tile_rows: Some(2),
            output_dir: Some(dir.to_path_buf()),
            seed: Some(11),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        VectorGenerator::new(config).run().unwrap();
    }

    fn simulate_from_expected(dir: &Path, index: usize) {
        let case = case_dir(dir, index);
        fs::copy(case.join(files::OUTPUT_EXPECTED), case.join(files::OUTPUT_MEM)).unwrap();
    }

    #[test]
    fn test_end_to_end_pass() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 2);
        simulate_from_expected(dir.path(), 0);
        simulate_from_expected(dir.path(), 1);

        let mut verifier = Verifier::new(dir.path(), 2);
        let result = verifier.run_all();
        assert_eq!(result.passed, 2);
        assert!(result.all_passed());
        assert!((result.pass_rate() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_corrupted_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 1);

        let case = case_dir(dir.path(), 0);
        let manifest = CaseManifest::from_file(&case.join(files::CASE_MANIFEST)).unwrap();
        let sat = manifest.format().unwrap();
        let golden_path = case.join(files::OUTPUT_GOLDEN);
        let golden = read_golden(&golden_path, 2, 2, sat, HEX_COLUMN_ORDER).unwrap();

        // change exactly one element
        let corrupted = Matrix::from_fn(2, 2, |i, j| match (golden.get(i, j), (i, j)) {
            (0, (1, 0)) => 1,
            (_, (1, 0)) => 0,
            (v, _) => v,
        });
        let mut set = crate::generator::StreamSet::new(&case).unwrap();
        set.write_hex(files::OUTPUT_MEM, &stagger(&corrupted), sat, HEX_COLUMN_ORDER).unwrap();
        set.commit().unwrap();

        let verifier = Verifier::new(dir.path(), 1);
        match verifier.run_single(0) {
            CaseOutcome::Failed { mismatches, first } => {
                assert_eq!(mismatches, 1);
                assert!(first.contains("[1][0]"), "{}", first);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_case_is_unsuccessful() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 1);
        simulate_from_expected(dir.path(), 0);

        // case 1 was never generated, case 0 passes
        let mut verifier = Verifier::new(dir.path(), 2);
        let result = verifier.run_all();
        assert_eq!(result.passed, 1);
        assert_eq!(result.unsuccessful, 1);
        assert!(!result.all_passed());
        assert!(matches!(verifier.results()[1].1, CaseOutcome::Unsuccessful { .. }));
    }

    #[test]
    fn test_missing_output_mem_is_unsuccessful() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 1);

        let verifier = Verifier::new(dir.path(), 1);
        match verifier.run_single(0) {
            CaseOutcome::Unsuccessful { reason } => assert!(reason.contains("output_mem.hex")),
            other => panic!("expected unsuccessful, got {:?}", other),
        }
    }

    #[test]
    fn test_accum_target() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 1);

        let case = case_dir(dir.path(), 0);
        let sat = Saturation::int8();
        let accum_path = case.join(files::ACCUM_GOLDEN);
        let accum = read_golden(&accum_path, 2, 2, sat, HEX_COLUMN_ORDER).unwrap();
        let mut set = crate::generator::StreamSet::new(&case).unwrap();
        set.write_hex(files::OUTPUT_MEM, &stagger(&accum), sat, HEX_COLUMN_ORDER).unwrap();
        set.commit().unwrap();

        let verifier = Verifier::new(dir.path(), 1).with_target(CompareTarget::Accum);
        assert_eq!(verifier.run_single(0), CaseOutcome::Passed);
    }

    #[test]
    fn test_binary_dump() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 1);

        let case = case_dir(dir.path(), 0);
        let sat = Saturation::int8();
        let golden_path = case.join(files::OUTPUT_GOLDEN);
        let golden = read_golden(&golden_path, 2, 2, sat, HEX_COLUMN_ORDER).unwrap();
        let lines: Vec<String> = stagger(&golden)
            .iter_rows()
            .map(|row| encode_row(row, sat, FieldFormat::Binary, HEX_COLUMN_ORDER).unwrap())
            .collect();
        fs::write(case.join(files::OUTPUT_MEM), lines.join("\n")).unwrap();

        // 16-digit lines do not split into two hex fields
        let hex = Verifier::new(dir.path(), 1);
        assert!(matches!(hex.run_single(0), CaseOutcome::Unsuccessful { .. }));

        let binary = Verifier::new(dir.path(), 1).with_dump_format(FieldFormat::Binary);
        assert_eq!(binary.run_single(0), CaseOutcome::Passed);
    }

    #[test]
    fn test_summary_report_layout() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), 1);
        simulate_from_expected(dir.path(), 0);

        let mut verifier = Verifier::new(dir.path(), 2);
        let result = verifier.run_all();
        let report = verifier.summary_report(&result);
        assert_eq!(
            report,
            "----- Summary -----\n\
             Total Tests: 2\n\
             Passed Tests: 1\n\
             Grade: 50.00\n\
             \n\
             ----- Results -----\n\
             Test 0: PASSED\n\
             Test 1: UNSUCCESSFUL\n"
        );

        let log = dir.path().join(SUMMARY_LOG);
        verifier.write_summary(&log, &result).unwrap();
        assert_eq!(fs::read_to_string(log).unwrap(), report);
    }

    #[test]
    fn test_compare_target_parse() {
        assert_eq!("result".parse::<CompareTarget>().unwrap(), CompareTarget::Result);
        assert_eq!("accum".parse::<CompareTarget>().unwrap(), CompareTarget::Accum);
        assert!("psum".parse::<CompareTarget>().is_err());
    }

    #[test]
    fn test_pass_rate_empty() {
        let result = SuiteResult {
            total: 0,
            passed: 0,
            failed: 0,
            unsuccessful: 0,
        };
        assert_eq!(result.pass_rate(), 0.0);
    }
}
