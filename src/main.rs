//! systolic-golden: test vectors and verification for systolic-array matmul

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use systolic_golden::codec::FieldFormat;
use systolic_golden::config::Config;
use systolic_golden::generator::VectorGenerator;
use systolic_golden::verify::{CompareTarget, Verifier, SUMMARY_LOG};

#[derive(Parser, Debug)]
#[command(name = "systolic-golden", version, about)]
struct Cli {
    /// Extra config file, applied over the user and project configs
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate stimulus, golden outputs and memory-initialization files
    Generate {
        #[arg(short = 'n', long)]
        num_tests: Option<usize>,
        /// Element width in bits
        #[arg(short, long)]
        width: Option<u32>,
        /// Unsigned elements instead of two's complement
        #[arg(long)]
        unsigned: bool,
        #[arg(long)]
        max_k: Option<usize>,
        #[arg(long)]
        max_n: Option<usize>,
        #[arg(long)]
        tile_rows: Option<usize>,
        #[arg(long)]
        tile_k: Option<usize>,
        #[arg(long)]
        tile_n: Option<usize>,
        /// Draw a random tile shape for every case
        #[arg(long)]
        random_tiles: bool,
        /// Percentage of overflow-prone cases
        #[arg(long)]
        overflow_percent: Option<u32>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Also write packed DMA word files
        #[arg(long)]
        dma: bool,
    },
    /// Compare hardware output dumps with the golden images
    Verify {
        /// Directory holding random/test_<i>/ (defaults to the configured output_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short = 'n', long)]
        num_tests: Option<usize>,
        /// Golden matrix to compare against: result or accum
        #[arg(long, default_value = "result")]
        target: CompareTarget,
        /// Digit format of output_mem dumps: h (hex) or b (binary)
        #[arg(long, default_value = "h")]
        format: FieldFormat,
        /// Where to write the summary log
        #[arg(long, default_value = SUMMARY_LOG)]
        summary: PathBuf,
    },
    /// Print a sample config file
    SampleConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(path) = &cli.config {
        let extra = Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        config.merge(extra);
    }

    match cli.command {
        Command::Generate {
            num_tests,
            width,
            unsigned,
            max_k,
            max_n,
            tile_rows,
            tile_k,
            tile_n,
            random_tiles,
            overflow_percent,
            output_dir,
            seed,
            dma,
        } => {
            config.merge(Config {
                num_tests,
                width,
                signed: unsigned.then_some(false),
                max_k,
                max_n,
                tile_rows,
                tile_k,
                tile_n,
                randomize_tiles: random_tiles.then_some(true),
                overflow_percent,
                output_dir,
                seed,
                emit_dma: dma.then_some(true),
            });
            let gen_config = config.resolve().context("Invalid configuration")?;
            let output_dir = gen_config.output_dir.clone();
            let summary = VectorGenerator::new(gen_config)
                .run()
                .context("Failed to generate test vectors")?;
            println!(
                "Generated {} test cases ({} overflow-prone), {} files in {}",
                summary.cases,
                summary.overflow_cases,
                summary.files.len(),
                output_dir.display()
            );
        }

        Command::Verify {
            dir,
            num_tests,
            target,
            format,
            summary,
        } => {
            config.merge(Config {
                num_tests,
                output_dir: dir,
                ..Default::default()
            });
            let gen_config = config.resolve().context("Invalid configuration")?;

            let mut verifier = Verifier::new(&gen_config.output_dir, gen_config.num_tests)
                .with_target(target)
                .with_dump_format(format);
            let result = verifier.run_all();
            verifier
                .write_summary(&summary, &result)
                .with_context(|| format!("Failed to write {}", summary.display()))?;
            print!("{}", verifier.summary_report(&result));

            if !result.all_passed() {
                bail!(
                    "{} of {} test cases did not pass",
                    result.total - result.passed,
                    result.total
                );
            }
        }

        Command::SampleConfig => {
            if let Some(path) = Config::user_config_path() {
                eprintln!("# Save to {}", path.display());
            }
            print!("{}", Config::sample_config());
        }
    }

    Ok(())
}
