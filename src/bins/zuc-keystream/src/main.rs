//! zuc-keystream
//!
//! Prints ZUC keystream words for a key and IV given on the command line.
//! The IV is either passed directly or derived from the 128-EEA3 bearer
//! parameters (COUNT, BEARER, DIRECTION).

use anyhow::{bail, Context, Result};
use clap::Parser;
use sm_crypt::zuc::{eea_iv, Zuc, KEY_SIZE_128};

/// Print ZUC keystream words
#[derive(Parser, Debug)]
#[command(name = "zuc-keystream")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate ZUC-128/ZUC-256 keystream words", long_about = None)]
struct Args {
    /// Key in hex (16 or 32 bytes)
    #[arg(short = 'k', long)]
    key: String,

    /// IV in hex (16 bytes for a 16-byte key, 23 bytes for a 32-byte key)
    #[arg(short = 'i', long, conflicts_with = "count")]
    iv: Option<String>,

    /// 128-EEA3 COUNT, used to derive the IV instead of --iv
    #[arg(long, requires = "bearer")]
    count: Option<u32>,

    /// 128-EEA3 BEARER (5 bits)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..32))]
    bearer: Option<u32>,

    /// 128-EEA3 DIRECTION (0 or 1)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..2))]
    direction: u32,

    /// Number of keystream words to print
    #[arg(short = 'n', long, default_value = "8")]
    words: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'e', long, default_value = "warn")]
    log_level: String,

    /// Disable color output
    #[arg(short = 'm', long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let key = hex::decode(args.key.trim()).context("Failed to decode --key as hex")?;
    let iv = resolve_iv(&args, key.len())?;

    let mut zuc = Zuc::new(&key, &iv).context("Failed to create ZUC generator")?;
    log::info!(
        "Generating {} keystream words (key {} bits)",
        args.words,
        key.len() * 8
    );

    let mut words = vec![0u32; args.words];
    zuc.fill(&mut words);
    for word in words {
        println!("0x{:08x}", word);
    }

    Ok(())
}

/// Take the IV from --iv, or build it from the EEA3 parameters
fn resolve_iv(args: &Args, key_len: usize) -> Result<Vec<u8>> {
    if let Some(ref iv) = args.iv {
        return hex::decode(iv.trim()).context("Failed to decode --iv as hex");
    }

    match (args.count, args.bearer) {
        (Some(count), Some(bearer)) => {
            if key_len != KEY_SIZE_128 {
                bail!("EEA3 parameters need a {}-byte key, got {} bytes", KEY_SIZE_128, key_len);
            }
            log::debug!(
                "Deriving EEA3 IV (count={:#010x}, bearer={}, direction={})",
                count,
                bearer,
                args.direction
            );
            Ok(eea_iv(count, bearer, args.direction).to_vec())
        }
        _ => bail!("Either --iv or --count with --bearer must be given"),
    }
}

/// Initialize logging based on command line arguments
fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Warn,
    };
    builder.filter_level(level);
    builder.format_timestamp_millis();

    if args.no_color {
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("zuc-keystream").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_iv_from_hex() {
        let args = parse(&["--key", "00000000000000000000000000000000", "--iv", "0102"]);
        assert_eq!(resolve_iv(&args, 16).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_iv_from_eea3_parameters() {
        let args = parse(&["-k", "00", "--count", "1711494290", "--bearer", "15"]);
        assert_eq!(resolve_iv(&args, 16).unwrap(), eea_iv(0x6603_5492, 0x0F, 0).to_vec());
    }

    #[test]
    fn test_eea3_parameters_need_128_bit_key() {
        let args = parse(&["-k", "00", "--count", "1", "--bearer", "2"]);
        assert!(resolve_iv(&args, 32).is_err());
    }

    #[test]
    fn test_missing_iv_is_an_error() {
        let args = parse(&["-k", "00"]);
        assert!(resolve_iv(&args, 16).is_err());
    }

    #[test]
    fn test_bearer_range_checked() {
        let argv = ["zuc-keystream", "-k", "00", "--count", "1", "--bearer", "32"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
