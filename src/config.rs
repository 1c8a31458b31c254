//! Configuration management for systolic-golden.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables (`SYSTOLIC_GOLDEN_OUTPUT_DIR`, `SYSTOLIC_GOLDEN_SEED`)
//! 3. Project-local config file (`./systolic-golden.toml`)
//! 4. User config file (`~/.config/systolic-golden/config.toml`)
//! 5. Built-in defaults
//!
//! The merged [`Config`] is then resolved into a validated [`GenConfig`],
//! which is what the generator and verifier take. Nothing is cached
//! process-wide; each run owns its configuration.
//!
//! # Config File Format
//!
//! ```toml
//! # systolic-golden.toml
//! num_tests = 8
//! width = 8
//! signed = true
//! max_k = 4
//! max_n = 4
//! tile_rows = 4
//! output_dir = "test_vec"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::arith::Saturation;
use crate::error::{Error, Result};
use crate::generator::TileDims;

const LOCAL_CONFIG: &str = "systolic-golden.toml";
const APP_DIR: &str = "systolic-golden";

/// Layered configuration. Every field is optional so that sources can be
/// merged; [`Config::resolve`] fills in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Number of test cases per run.
    pub num_tests: Option<usize>,
    /// Element width in bits (1..=32).
    pub width: Option<u32>,
    /// Two's-complement elements when true.
    pub signed: Option<bool>,
    /// Array rows (reduction dimension capacity).
    pub max_k: Option<usize>,
    /// Array columns (output dimension capacity).
    pub max_n: Option<usize>,
    /// Input rows per tile, or the upper bound when tiles are randomized.
    pub tile_rows: Option<usize>,
    /// Reduction size per tile. Defaults to `max_k`.
    pub tile_k: Option<usize>,
    /// Output columns per tile. Defaults to `max_n`.
    pub tile_n: Option<usize>,
    /// Draw a fresh tile shape for every case.
    pub randomize_tiles: Option<bool>,
    /// Percentage of cases drawn from the overflow-prone range.
    pub overflow_percent: Option<u32>,
    /// Where vector files are written.
    pub output_dir: Option<PathBuf>,
    /// Seed for reproducible stimulus.
    pub seed: Option<u64>,
    /// Also emit packed DMA word files.
    pub emit_dma: Option<bool>,
}

/// Validated configuration for one generation or verification run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenConfig {
    pub num_tests: usize,
    pub format: Saturation,
    pub max_k: usize,
    pub max_n: usize,
    pub tile: TileDims,
    pub randomize_tiles: bool,
    pub overflow_percent: u32,
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
    pub emit_dma: bool,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `systolic-golden.toml`
    /// 3. User config `~/.config/systolic-golden/config.toml`
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        if let Some(local_config) = Self::load_from_file(Path::new(LOCAL_CONFIG)) {
            config.merge(local_config);
        }

        config.apply_env_overrides();

        log::debug!("Loaded configuration: {:?}", config);
        config
    }

    /// Load user configuration from ~/.config/systolic-golden/config.toml
    fn load_user_config() -> Option<Self> {
        let path = Self::user_config_path()?;
        Self::load_from_file(&path)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    pub fn merge(&mut self, other: Self) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(
            num_tests,
            width,
            signed,
            max_k,
            max_n,
            tile_rows,
            tile_k,
            tile_n,
            randomize_tiles,
            overflow_percent,
            output_dir,
            seed,
            emit_dma
        );
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("SYSTOLIC_GOLDEN_OUTPUT_DIR") {
            log::info!("Using SYSTOLIC_GOLDEN_OUTPUT_DIR from environment: {}", dir);
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Ok(seed) = std::env::var("SYSTOLIC_GOLDEN_SEED") {
            match seed.parse() {
                Ok(seed) => {
                    log::info!("Using SYSTOLIC_GOLDEN_SEED from environment: {}", seed);
                    self.seed = Some(seed);
                }
                Err(e) => log::warn!("Ignoring SYSTOLIC_GOLDEN_SEED={:?}: {}", seed, e),
            }
        }
    }

    /// Fill defaults and validate.
    pub fn resolve(&self) -> Result<GenConfig> {
        let format = Saturation::new(self.width.unwrap_or(8), self.signed.unwrap_or(true))?;
        let max_k = self.max_k.unwrap_or(4);
        let max_n = self.max_n.unwrap_or(4);
        if max_k == 0 || max_n == 0 {
            return Err(Error::Config("array capacity must be at least 1x1".to_string()));
        }
        // Staggered input is left-padded by max_n - K columns.
        if max_k > max_n {
            return Err(Error::Config(format!(
                "max_k ({}) must not exceed max_n ({})",
                max_k, max_n
            )));
        }

        let tile = TileDims {
            t: self.tile_rows.unwrap_or(4),
            k: self.tile_k.unwrap_or(max_k),
            n: self.tile_n.unwrap_or(max_n),
        };
        tile.check(max_k, max_n)?;

        let overflow_percent = self.overflow_percent.unwrap_or(30);
        if overflow_percent > 100 {
            return Err(Error::Config(format!(
                "overflow_percent must be 0..=100, got {}",
                overflow_percent
            )));
        }

        Ok(GenConfig {
            num_tests: self.num_tests.unwrap_or(1),
            format,
            max_k,
            max_n,
            tile,
            randomize_tiles: self.randomize_tiles.unwrap_or(false),
            overflow_percent,
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("test_vec")),
            seed: self.seed,
            emit_dma: self.emit_dma.unwrap_or(false),
        })
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# systolic-golden configuration
# Place this file at ~/.config/systolic-golden/config.toml or ./systolic-golden.toml

# Number of test cases per run
num_tests = 8

# Element format
width = 8
signed = true

# Physical array capacity (rows x columns of processing elements)
max_k = 4
max_n = 4

# Tile shape; tile_k / tile_n default to the array capacity
tile_rows = 4
# tile_k = 4
# tile_n = 4
# randomize_tiles = false

# Share of cases drawn from the overflow-prone range
overflow_percent = 30

# Output directory for memory-initialization files
output_dir = "test_vec"

# Fixed seed for reproducible vectors (optional)
# seed = 1

# Emit packed DMA words alongside the decimal streams
# emit_dma = false
"#
        .to_string()
    }
}
