//! Test-vector generation for the weight-stationary array.
//!
//! One run produces, for every test case:
//!
//! - random input `A (T x K)`, weight `B (K x N)` and partial sum `P (T x N)`
//! - the golden `Result = A x B` and `Accum = Result + P`
//! - every matrix in natural layout and in the staggered/padded layout the
//!   array consumes, each followed by a sentinel row
//! - one control descriptor per layout
//! - a per-case directory of hex ROM images and a `case.toml` manifest used
//!   by the verifier
//!
//! All files are staged through [`StreamSet`] and committed together at the
//! end of the run.
//!
//! # Example
//!
//! ```ignore
//! use systolic_golden::config::Config;
//! use systolic_golden::generator::VectorGenerator;
//!
//! let config = Config::load().resolve()?;
//! let summary = VectorGenerator::new(config).run()?;
//! println!("{} cases, {} files", summary.cases, summary.files.len());
//! ```

pub mod control;
pub mod streams;

pub use control::{ControlDescriptor, OffsetAccumulator, StreamOffsets};
pub use streams::{StagedStreams, StreamSet, SENTINEL};

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::arith::Saturation;
use crate::codec::ColumnOrder;
use crate::config::GenConfig;
use crate::error::{Error, Result};
use crate::golden::{golden_matmul, GoldenOutput};
use crate::matrix::stagger::{flip_rows, pad_columns, pad_rows, stagger};
use crate::matrix::Matrix;

/// File names of the concatenated streams read by the testbench.
pub mod files {
    pub const INPUT: &str = "peArr_inputMatrix_data_ws.txt";
    pub const INPUT_SHIFTED: &str = "peArr_inputMatrix_data_shifted_ws.txt";
    pub const WEIGHT: &str = "peArr_weightMatrix_data_ws.txt";
    pub const WEIGHT_SHIFTED: &str = "peArr_weightMatrix_data_shifted_ws.txt";
    pub const WEIGHT_FLIP: &str = "peArr_weightMatrix_data_flip_ws.txt";
    pub const OUTPUT: &str = "peArr_output_data_ws.txt";
    pub const OUTPUT_SHIFTED: &str = "peArr_output_data_shifted_ws.txt";
    pub const PSUM: &str = "peArr_pSum_data_ws.txt";
    pub const PSUM_SHIFTED: &str = "peArr_pSum_data_shifted_ws.txt";
    pub const ACCUM: &str = "peArr_accum_data_ws.txt";
    pub const ACCUM_SHIFTED: &str = "peArr_accum_data_shifted_ws.txt";
    pub const CTRL: &str = "peArr_ctrl_data_ws.txt";
    pub const CTRL_SHIFTED: &str = "peArr_ctrl_data_shifted_ws.txt";
    pub const INPUT_SHIFTED_DMA: &str = "input_shifted_dma.txt";
    pub const WEIGHT_FLIP_DMA: &str = "weight_flip_dma.txt";

    // Per-case directory
    pub const INPUT_ROM: &str = "input_rom.hex";
    pub const WEIGHT_ROM: &str = "weight_rom.hex";
    pub const OUTPUT_GOLDEN: &str = "output_golden.hex";
    pub const ACCUM_GOLDEN: &str = "accum_golden.hex";
    pub const OUTPUT_EXPECTED: &str = "output_expected.hex";
    pub const OUTPUT_MEM: &str = "output_mem.hex";
    pub const CASE_MANIFEST: &str = "case.toml";
}

/// Column order of the input ROM, golden and output hex images.
pub const HEX_COLUMN_ORDER: ColumnOrder = ColumnOrder::MsbFirst;

/// Column order of `weight_rom.hex`: column 0 leftmost, as the weight
/// loader reads it.
pub const WEIGHT_ROM_ORDER: ColumnOrder = ColumnOrder::LsbFirst;

/// Directory holding the per-case artifacts of case `index`.
pub fn case_dir(base: &Path, index: usize) -> PathBuf {
    base.join("random").join(format!("test_{}", index))
}

/// Tile shape: `A` is `t x k`, `B` is `k x n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDims {
    pub t: usize,
    pub k: usize,
    pub n: usize,
}

impl TileDims {
    /// Reject empty tiles and tiles that exceed the array.
    pub fn check(&self, max_k: usize, max_n: usize) -> Result<()> {
        if self.t == 0 || self.k == 0 || self.n == 0 {
            return Err(Error::Config(format!("tile dimensions must be non-zero: {:?}", self)));
        }
        if self.k > max_k {
            return Err(Error::DimensionOverflow {
                dim: "K",
                requested: self.k,
                capacity: max_k,
            });
        }
        if self.n > max_n {
            return Err(Error::DimensionOverflow {
                dim: "N",
                requested: self.n,
                capacity: max_n,
            });
        }
        Ok(())
    }
}

/// A half-open integer range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    pub low: i64,
    pub high: i64,
}

impl ValueRange {
    /// Draw one value. An empty range yields `low`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        if self.high <= self.low {
            self.low
        } else {
            rng.random_range(self.low..self.high)
        }
    }

    /// Fill a `rows x cols` matrix.
    pub fn matrix<R: Rng + ?Sized>(&self, rng: &mut R, rows: usize, cols: usize) -> Matrix {
        Matrix::from_fn(rows, cols, |_, _| self.sample(rng))
    }
}

/// Which value distribution a test case draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusMode {
    /// Full element range: products and sums saturate routinely.
    MayOverflow,
    /// Operands small enough that a row of products rarely saturates.
    NoOverflow,
}

/// Operand and partial-sum ranges for one stimulus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusRanges {
    pub operand: ValueRange,
    pub psum: ValueRange,
}

impl StimulusMode {
    /// Pick a mode, overflow-prone with probability `overflow_percent`%.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R, overflow_percent: u32) -> Self {
        if rng.random_range(0..100) < overflow_percent {
            StimulusMode::MayOverflow
        } else {
            StimulusMode::NoOverflow
        }
    }

    /// Value ranges for `n` output columns.
    ///
    /// The no-overflow bound `sqrt(max / n / 2)` is a heuristic. It keeps
    /// most dot products in range but does not guarantee it.
    pub fn ranges(self, sat: Saturation, n: usize) -> StimulusRanges {
        let (min, max) = (sat.min_value(), sat.max_value());
        match self {
            StimulusMode::MayOverflow => {
                let full = ValueRange { low: min, high: max };
                StimulusRanges {
                    operand: full,
                    psum: full,
                }
            }
            StimulusMode::NoOverflow => {
                let bound = (max as f64 / n.max(1) as f64 / 2.0).sqrt();
                let low = if sat.signed() { -bound as i64 } else { 0 };
                StimulusRanges {
                    operand: ValueRange {
                        low,
                        high: bound as i64,
                    },
                    psum: ValueRange { low, high: max / 2 },
                }
            }
        }
    }
}

/// Stimulus and golden outputs for one test case.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub index: usize,
    pub dims: TileDims,
    pub mode: StimulusMode,
    pub input: Matrix,
    pub weight: Matrix,
    pub psum: Matrix,
    pub golden: GoldenOutput,
}

/// Matrices of one case rearranged for the array's `(max_k, max_n)` footprint.
#[derive(Debug, Clone)]
pub struct ArrayLayout {
    /// Staggered input, left-padded to `max_n` columns and bottom-padded to
    /// `T - 1 + max(K, N)` rows.
    pub input: Matrix,
    /// Weight padded to `max_k x max_n` (zero rows on top, zero columns right).
    pub weight: Matrix,
    /// `weight` with rows reversed for bottom-up loading.
    pub weight_flipped: Matrix,
    pub output: Matrix,
    pub psum: Matrix,
    pub accum: Matrix,
}

/// Serialized next to each case's hex images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseManifest {
    pub index: usize,
    pub t: usize,
    pub k: usize,
    pub n: usize,
    pub width: u32,
    pub signed: bool,
    pub mode: StimulusMode,
}

impl CaseManifest {
    /// Element format recorded in the manifest.
    pub fn format(&self) -> Result<Saturation> {
        Saturation::new(self.width, self.signed)
    }

    /// Read `case.toml` from a case directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))
    }
}

impl TestCase {
    /// Pad and stagger every matrix for an array of `max_k x max_n` PEs.
    ///
    /// Every staggered matrix comes out `max_n` columns wide. Panics when
    /// the tile does not fit or `k > max_n`; resolved configurations rule
    /// both out.
    pub fn layout(&self, max_k: usize, max_n: usize) -> ArrayLayout {
        let TileDims { k, n, .. } = self.dims;

        let weight = pad_rows(&pad_columns(&self.weight, 0, max_n - n, 0), max_k - k, 0, 0);
        let weight_flipped = flip_rows(&weight);

        let mut input = pad_columns(&stagger(&self.input), max_n - k, 0, 0);
        if k < n {
            input = pad_rows(&input, 0, n - k, 0);
        }

        let skew_out = |m: &Matrix| pad_columns(&stagger(m), 0, max_n - n, 0);

        ArrayLayout {
            input,
            weight,
            weight_flipped,
            output: skew_out(&self.golden.result),
            psum: skew_out(&self.psum),
            accum: skew_out(&self.golden.accum),
        }
    }

    /// Manifest for the verifier.
    pub fn manifest(&self, sat: Saturation) -> CaseManifest {
        CaseManifest {
            index: self.index,
            t: self.dims.t,
            k: self.dims.k,
            n: self.dims.n,
            width: sat.width(),
            signed: sat.signed(),
            mode: self.mode,
        }
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of cases generated.
    pub cases: usize,
    /// How many of them drew from the overflow-prone range.
    pub overflow_cases: usize,
    /// Every committed file.
    pub files: Vec<PathBuf>,
}

/// Generates and writes test vectors.
pub struct VectorGenerator<R = StdRng> {
    config: GenConfig,
    rng: R,
}

impl VectorGenerator<StdRng> {
    /// Seed from `config.seed`, or from the OS when unset.
    pub fn new(config: GenConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }
}

impl<R: Rng> VectorGenerator<R> {
    /// Tile shape for the next case.
    pub fn next_dims(&mut self) -> TileDims {
        if !self.config.randomize_tiles {
            return self.config.tile;
        }
        TileDims {
            t: self.rng.random_range(1..=self.config.tile.t),
            k: self.rng.random_range(1..=self.config.max_k),
            n: self.rng.random_range(1..=self.config.max_n),
        }
    }

    /// Draw stimulus for one case and compute its golden outputs.
    pub fn draw_case(&mut self, index: usize, dims: TileDims) -> Result<TestCase> {
        dims.check(self.config.max_k, self.config.max_n)?;
        let sat = self.config.format;

        let mode = StimulusMode::choose(&mut self.rng, self.config.overflow_percent);
        let ranges = mode.ranges(sat, dims.n);
        let input = ranges.operand.matrix(&mut self.rng, dims.t, dims.k);
        let weight = ranges.operand.matrix(&mut self.rng, dims.k, dims.n);
        let psum = ranges.psum.matrix(&mut self.rng, dims.t, dims.n);
        let golden = golden_matmul(&input, &weight, &psum, sat)?;

        log::debug!("Case {}: {:?}, {:?}", index, dims, mode);
        log::trace!("A =\n{}B =\n{}P =\n{}", input, weight, psum);

        Ok(TestCase {
            index,
            dims,
            mode,
            input,
            weight,
            psum,
            golden,
        })
    }

    /// Generate every case and commit all files.
    ///
    /// Every file is written and flushed before the first one is renamed
    /// into place, so a failing case commits nothing. A rename failure
    /// part-way through the commit leaves the files renamed before it.
    pub fn run(&mut self) -> Result<RunSummary> {
        let base = self.config.output_dir.clone();
        let mut streams = StreamSet::new(&base)?;
        let mut case_sets = Vec::with_capacity(self.config.num_tests);
        let mut natural = OffsetAccumulator::new();
        let mut staggered = OffsetAccumulator::new();
        let mut overflow_cases = 0;

        for index in 0..self.config.num_tests {
            let dims = self.next_dims();
            let case = self.draw_case(index, dims)?;
            if case.mode == StimulusMode::MayOverflow {
                overflow_cases += 1;
            }

            self.emit_streams(&case, &mut streams, &mut natural, &mut staggered)?;

            let mut case_set = StreamSet::new(case_dir(&base, index))?;
            self.emit_case_artifacts(&case, &mut case_set)?;
            case_sets.push(case_set);
        }

        let mut staged = streams.stage()?;
        for set in case_sets {
            staged.extend(set.stage()?);
        }
        let files = staged.persist()?;

        log::info!(
            "Generated {} test cases ({} overflow-prone) into {}",
            self.config.num_tests,
            overflow_cases,
            base.display()
        );

        Ok(RunSummary {
            cases: self.config.num_tests,
            overflow_cases,
            files,
        })
    }

    /// Append one case to the concatenated testbench streams.
    fn emit_streams(
        &self,
        case: &TestCase,
        streams: &mut StreamSet,
        natural: &mut OffsetAccumulator,
        staggered: &mut OffsetAccumulator,
    ) -> Result<()> {
        let cfg = &self.config;
        let layout = case.layout(cfg.max_k, cfg.max_n);

        streams.write_decimal_terminated(files::PSUM, &case.psum)?;
        streams.write_decimal_terminated(files::ACCUM, &case.golden.accum)?;
        streams.write_decimal_terminated(files::INPUT, &case.input)?;
        streams.write_decimal_terminated(files::OUTPUT, &case.golden.result)?;
        streams.write_decimal_terminated(files::WEIGHT, &case.weight)?;

        streams.write_decimal_terminated(files::WEIGHT_SHIFTED, &layout.weight)?;
        streams.write_decimal_terminated(files::INPUT_SHIFTED, &layout.input)?;
        streams.write_decimal_terminated(files::OUTPUT_SHIFTED, &layout.output)?;
        streams.write_decimal_terminated(files::PSUM_SHIFTED, &layout.psum)?;
        streams.write_decimal_terminated(files::ACCUM_SHIFTED, &layout.accum)?;
        streams.write_decimal_terminated(files::WEIGHT_FLIP, &layout.weight_flipped)?;

        if cfg.emit_dma {
            streams.write_packed(files::INPUT_SHIFTED_DMA, &layout.input, cfg.format)?;
            streams.write_packed(files::WEIGHT_FLIP_DMA, &layout.weight_flipped, cfg.format)?;
        }

        let ctrl = ControlDescriptor::natural(case.dims, natural);
        let ctrl_shifted = ControlDescriptor::staggered(case.dims, cfg.max_k, staggered);
        log::debug!("Case {}: ctrl [{}], ctrl_shifted [{}]", case.index, ctrl, ctrl_shifted);
        streams.write_line(files::CTRL, &ctrl.to_string())?;
        streams.write_line(files::CTRL_SHIFTED, &ctrl_shifted.to_string())?;

        Ok(())
    }

    /// Write the per-case hex images and manifest.
    fn emit_case_artifacts(&self, case: &TestCase, set: &mut StreamSet) -> Result<()> {
        let sat = self.config.format;

        let expected = stagger(&case.golden.result);

        set.write_hex(files::INPUT_ROM, &stagger(&case.input), sat, HEX_COLUMN_ORDER)?;
        set.write_hex(files::WEIGHT_ROM, &flip_rows(&case.weight), sat, WEIGHT_ROM_ORDER)?;
        set.write_hex(files::OUTPUT_GOLDEN, &case.golden.result, sat, HEX_COLUMN_ORDER)?;
        set.write_hex(files::ACCUM_GOLDEN, &case.golden.accum, sat, HEX_COLUMN_ORDER)?;
        set.write_hex(files::OUTPUT_EXPECTED, &expected, sat, HEX_COLUMN_ORDER)?;

        let manifest =
            toml::to_string(&case.manifest(sat)).map_err(|e| Error::Manifest(e.to_string()))?;
        set.write_line(files::CASE_MANIFEST, manifest.trim_end())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::matrix::destagger;
    use std::fs;

    fn gen_config(dir: &Path, num_tests: usize, t: usize, max_k: usize, max_n: usize) -> GenConfig {
        Config {
            num_tests: Some(num_tests),
            max_k: Some(max_k),
            max_n: Some(max_n),
            tile_rows: Some(t),
            output_dir: Some(dir.to_path_buf()),
            seed: Some(42),
            ..Default::default()
        }
        .resolve()
        .unwrap()
    }

    fn lines(path: PathBuf) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_draw_case_golden_matches_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut gen = VectorGenerator::new(gen_config(dir.path(), 1, 3, 2, 2));
        let case = gen.draw_case(0, TileDims { t: 3, k: 2, n: 2 }).unwrap();

        assert_eq!(case.input.shape(), (3, 2));
        assert_eq!(case.weight.shape(), (2, 2));
        assert_eq!(case.psum.shape(), (3, 2));
        let sat = Saturation::int8();
        let expected = golden_matmul(&case.input, &case.weight, &case.psum, sat).unwrap();
        assert_eq!(case.golden, expected);
    }

    #[test]
    fn test_draw_case_dimension_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let mut gen = VectorGenerator::new(gen_config(dir.path(), 1, 2, 2, 2));
        let err = gen.draw_case(0, TileDims { t: 2, k: 2, n: 3 }).unwrap_err();
        assert!(matches!(err, Error::DimensionOverflow { dim: "N", requested: 3, capacity: 2 }));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let config = gen_config(dir.path(), 1, 2, 2, 2);
        let a = VectorGenerator::new(config.clone()).draw_case(0, config.tile).unwrap();
        let b = VectorGenerator::new(config.clone()).draw_case(0, config.tile).unwrap();
        assert_eq!(a.input, b.input);
        assert_eq!(a.weight, b.weight);
        assert_eq!(a.psum, b.psum);
    }

    #[test]
    fn test_no_overflow_ranges_int8() {
        let ranges = StimulusMode::NoOverflow.ranges(Saturation::int8(), 4);
        // sqrt(127 / 4 / 2) = 3.98
        assert_eq!(ranges.operand, ValueRange { low: -3, high: 3 });
        assert_eq!(ranges.psum, ValueRange { low: -3, high: 63 });

        let full = StimulusMode::MayOverflow.ranges(Saturation::int8(), 4);
        assert_eq!(full.operand, ValueRange { low: -128, high: 127 });
    }

    #[test]
    fn test_no_overflow_unsigned_starts_at_zero() {
        let sat = Saturation::new(8, false).unwrap();
        let ranges = StimulusMode::NoOverflow.ranges(sat, 2);
        assert_eq!(ranges.operand.low, 0);
        assert_eq!(ranges.operand.high, 7); // sqrt(255 / 2 / 2) = 7.98
    }

    #[test]
    fn test_empty_range_yields_low() {
        let mut rng = StdRng::seed_from_u64(0);
        let r = ValueRange { low: 0, high: 0 };
        assert_eq!(r.sample(&mut rng), 0);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let r = ValueRange { low: -128, high: 127 };
        let m = r.matrix(&mut rng, 16, 16);
        assert!(m.as_slice().iter().all(|&v| (-128..127).contains(&v)));
    }

    #[test]
    fn test_randomized_dims_within_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = gen_config(dir.path(), 1, 5, 3, 4);
        config.randomize_tiles = true;
        let mut gen = VectorGenerator::new(config);
        for _ in 0..50 {
            let d = gen.next_dims();
            assert!((1..=5).contains(&d.t));
            assert!((1..=3).contains(&d.k));
            assert!((1..=4).contains(&d.n));
        }
    }

    #[test]
    fn test_layout_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let mut gen = VectorGenerator::new(gen_config(dir.path(), 1, 3, 4, 4));
        let case = gen.draw_case(0, TileDims { t: 3, k: 2, n: 3 }).unwrap();
        let layout = case.layout(4, 4);

        assert_eq!(layout.weight.shape(), (4, 4));
        assert_eq!(layout.weight_flipped, flip_rows(&layout.weight));
        // T + K - 1 = 4 staggered rows, plus N - K = 1 padding row
        assert_eq!(layout.input.shape(), (5, 4));
        assert_eq!(layout.output.shape(), (5, 4));

        // weight sits bottom-left after padding
        assert_eq!(layout.weight.get(2, 0), case.weight.get(0, 0));
        assert_eq!(layout.weight.get(0, 0), 0);
        assert_eq!(layout.weight.get(3, 3), 0);

        // input is pushed to the right edge
        assert_eq!(layout.input.get(0, 2), case.input.get(0, 0));
        assert_eq!(layout.input.get(0, 0), 0);

        // output staggering is recoverable after dropping the right padding
        let cropped = Matrix::from_fn(5, 3, |i, j| layout.output.get(i, j));
        assert_eq!(destagger(&cropped, 3, 3).unwrap(), case.golden.result);
    }

    #[test]
    fn test_staggered_input_always_max_n_wide() {
        let dir = tempfile::tempdir().unwrap();
        let mut gen = VectorGenerator::new(gen_config(dir.path(), 1, 2, 3, 3));
        for k in 1..=3 {
            for n in 1..=3 {
                let case = gen.draw_case(0, TileDims { t: 2, k, n }).unwrap();
                let layout = case.layout(3, 3);
                assert_eq!(layout.input.cols(), 3, "k={} n={}", k, n);
                assert_eq!(layout.output.cols(), 3, "k={} n={}", k, n);
            }
        }
    }

    #[test]
    fn test_weight_rom_column_zero_leftmost() {
        let dir = tempfile::tempdir().unwrap();
        let gen = VectorGenerator::new(gen_config(dir.path(), 1, 1, 2, 2));
        let sat = Saturation::int8();

        let input = Matrix::from_rows(&[[1, 0]]).unwrap();
        let weight = Matrix::from_rows(&[[5, -41], [113, -19]]).unwrap();
        let psum = Matrix::zeros(1, 2);
        let golden = golden_matmul(&input, &weight, &psum, sat).unwrap();
        let case = TestCase {
            index: 0,
            dims: TileDims { t: 1, k: 2, n: 2 },
            mode: StimulusMode::NoOverflow,
            input,
            weight,
            psum,
            golden,
        };

        let mut set = StreamSet::new(dir.path()).unwrap();
        gen.emit_case_artifacts(&case, &mut set).unwrap();
        set.commit().unwrap();

        // rows flipped, columns in natural order
        assert_eq!(lines(dir.path().join(files::WEIGHT_ROM)), vec!["71ed", "05d7"]);
        // golden keeps the highest column leftmost: result = [5, -41]
        assert_eq!(lines(dir.path().join(files::OUTPUT_GOLDEN)), vec!["d705"]);
    }

    #[test]
    fn test_run_writes_streams_and_control() {
        let dir = tempfile::tempdir().unwrap();
        let mut gen = VectorGenerator::new(gen_config(dir.path(), 2, 2, 2, 2));
        let summary = gen.run().unwrap();
        assert_eq!(summary.cases, 2);

        let base = dir.path();
        assert_eq!(lines(base.join(files::CTRL)), vec!["1 1 1 0 0 0 0", "1 1 1 2 2 2 2"]);
        assert_eq!(
            lines(base.join(files::CTRL_SHIFTED)),
            vec!["2 1 1 0 0 0 0 2", "2 1 1 2 2 2 3 2"]
        );

        // 2 rows + sentinel per case
        let input = lines(base.join(files::INPUT));
        assert_eq!(input.len(), 6);
        assert_eq!(input[2], "-1 -1");
        // 3 staggered rows + sentinel per case
        assert_eq!(lines(base.join(files::INPUT_SHIFTED)).len(), 8);
        assert_eq!(lines(base.join(files::WEIGHT_FLIP)).len(), 6);
        assert!(!base.join(files::INPUT_SHIFTED_DMA).exists());

        for i in 0..2 {
            let case = case_dir(base, i);
            for name in [
                files::INPUT_ROM,
                files::WEIGHT_ROM,
                files::OUTPUT_GOLDEN,
                files::ACCUM_GOLDEN,
                files::OUTPUT_EXPECTED,
            ] {
                assert!(case.join(name).exists(), "missing {}", name);
            }
            let manifest = CaseManifest::from_file(&case.join(files::CASE_MANIFEST)).unwrap();
            assert_eq!(manifest.index, i);
            assert_eq!((manifest.t, manifest.k, manifest.n), (2, 2, 2));
            assert_eq!(manifest.format().unwrap(), Saturation::int8());
        }
    }

    #[test]
    fn test_run_with_dma() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = gen_config(dir.path(), 1, 2, 2, 2);
        config.emit_dma = true;
        VectorGenerator::new(config).run().unwrap();

        // no sentinel rows in packed files
        assert_eq!(lines(dir.path().join(files::INPUT_SHIFTED_DMA)).len(), 3);
        assert_eq!(lines(dir.path().join(files::WEIGHT_FLIP_DMA)).len(), 2);
    }

    #[test]
    fn test_failed_run_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = gen_config(dir.path(), 2, 2, 2, 2);
        config.randomize_tiles = false;
        config.tile = TileDims { t: 2, k: 3, n: 2 };
        assert!(VectorGenerator::new(config).run().is_err());
        assert!(!dir.path().join(files::INPUT).exists());
    }
}
