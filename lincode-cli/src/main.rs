mod stream;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use lincode::constructions::{golay24, hadamard_code};
use lincode::{DecodeOutcome, LinearCode, NdArray, NdArrayMut, SyndromeDecoder};
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::stream::{bit_string, Blocks};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encodes the bits on stdin, printing one codeword per line
    Encode {
        /// Code file: `generator` or `check` followed by a matrix
        code: PathBuf,
    },
    /// Decodes the bits on stdin, printing one message per line
    Decode {
        /// Code file: `generator` or `check` followed by a matrix
        code: PathBuf,

        /// Largest error weight to correct, defaults to (d - 1) / 2
        #[clap(short, long)]
        radius: Option<usize>,
    },
    /// Flips random positions in every block read from stdin
    Noisy {
        /// Number of positions to flip per block
        errors: usize,

        /// Code file: `generator` or `check` followed by a matrix
        code: PathBuf,

        /// Seed for a reproducible noise pattern
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Prints the parameters [n, k, d] of a code
    Info {
        /// Code file: `generator` or `check` followed by a matrix
        code: PathBuf,

        /// Also compute the covering radius
        #[clap(long)]
        covering_radius: bool,
    },
    /// Prints a code file for one of the built-in constructions
    Construct {
        /// The family of codes to build
        #[clap(value_enum)]
        family: Family,

        /// Dimension k of a Hadamard code
        #[clap(short, long, default_value_t = 3)]
        dimension: usize,

        /// Build the augmented Hadamard code of length 2^(k-1)
        #[clap(long)]
        augmented: bool,

        /// Print the parity-check matrix instead of the generator
        #[clap(long)]
        check: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Family {
    /// The extended binary Golay code [24, 12, 8]
    Golay24,
    /// First-order Hadamard codes
    Hadamard,
}

fn load_code(path: &Path) -> anyhow::Result<LinearCode> {
    let file = File::open(path)
        .with_context(|| format!("failed to open code file {}", path.display()))?;
    let code = LinearCode::read_from(BufReader::new(file))
        .with_context(|| format!("failed to read a code from {}", path.display()))?;
    info!("loaded {} from {}", code, path.display());
    Ok(code)
}

fn blocks(len: usize) -> Blocks<BufReader<io::StdinLock<'static>>> {
    Blocks::new(BufReader::new(io::stdin().lock()), len)
}

fn encode(code: &LinearCode, out: &mut impl Write) -> anyhow::Result<()> {
    for block in blocks(code.block_length()) {
        let message = block.context("failed to read a message from stdin")?;
        let codeword = code.encode(&message)?;
        let line = bit_string(&codeword);
        debug!("sent: {line}");
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn decode(code: &LinearCode, radius: Option<usize>, out: &mut impl Write) -> anyhow::Result<()> {
    let decoder = match radius {
        Some(t) => SyndromeDecoder::with_radius(code, t)?,
        None => SyndromeDecoder::new(code)?,
    };

    let (mut decoded, mut skipped) = (0usize, 0usize);
    for block in blocks(code.length()) {
        let word = block.context("failed to read a word from stdin")?;
        debug!("received: {}", bit_string(&word));
        match decoder.decode(&word)? {
            DecodeOutcome::Decoded { message, corrected } => {
                let line = bit_string(&message);
                debug!("decoded: {line} ({corrected} corrected)");
                writeln!(out, "{line}")?;
                decoded += 1;
            }
            DecodeOutcome::Uncorrectable => {
                warn!("skipping uncorrectable block {}", bit_string(&word));
                skipped += 1;
            }
        }
    }
    info!("decoded {decoded} blocks, skipped {skipped}");
    Ok(())
}

fn noisy(
    errors: usize,
    code: &LinearCode,
    seed: Option<u64>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let n = code.length();
    if errors > n {
        bail!("cannot flip {errors} positions in blocks of length {n}");
    }
    let mut rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_os_rng(),
    };

    for block in blocks(n) {
        let mut word = block.context("failed to read a word from stdin")?;
        for pos in rand::seq::index::sample(&mut rng, n, errors) {
            let bit = word.at(&[pos]);
            word.set(&[pos], bit ^ 1);
        }
        writeln!(out, "{}", bit_string(&word))?;
    }
    Ok(())
}

fn print_info(code: &LinearCode, covering_radius: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let [n, k, d, _] = code.n_k_d_q()?;
    writeln!(out, "[{n}, {k}, {d}]")?;
    writeln!(out, "rate {:.4}", code.rate())?;
    if covering_radius {
        writeln!(out, "covering radius {}", code.covering_radius()?)?;
    }
    Ok(())
}

fn construct(
    family: Family,
    dimension: usize,
    augmented: bool,
    check: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let code = match family {
        Family::Golay24 => LinearCode::from_generator(golay24())?,
        Family::Hadamard => hadamard_code(dimension, augmented)
            .with_context(|| format!("failed to build a Hadamard code of dimension {dimension}"))?,
    };
    info!("constructed {code}");
    if check {
        code.write_check(out)?;
    } else {
        code.write_generator(out)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let mut out = BufWriter::new(io::stdout().lock());

    match &cli.command {
        Commands::Encode { code } => encode(&load_code(code)?, &mut out)?,
        Commands::Decode { code, radius } => decode(&load_code(code)?, *radius, &mut out)?,
        Commands::Noisy { errors, code, seed } => noisy(*errors, &load_code(code)?, *seed, &mut out)?,
        Commands::Info {
            code,
            covering_radius,
        } => print_info(&load_code(code)?, *covering_radius, &mut out)?,
        Commands::Construct {
            family,
            dimension,
            augmented,
            check,
        } => construct(*family, *dimension, *augmented, *check, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
