use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use byteqr::{ECLevel, MaskPattern, QRBuilder, Version, QR};

#[derive(Parser, Debug)]
#[command(name = "byteqr")]
#[command(about = "Encode text as a version 1 or 2 QR code", long_about = None)]
struct Args {
    /// Text to encode, as UTF-8 bytes
    text: String,

    /// Strongest error correction level to try (L, M, Q, H)
    #[arg(short, long, default_value = "L", value_parser = parse_ec_level)]
    ec_level: ECLevel,

    /// Pin the version (1 or 2)
    #[arg(short, long)]
    version: Option<usize>,

    /// Force a mask pattern (0 to 7) instead of scoring all eight
    #[arg(short, long)]
    mask: Option<u8>,

    /// Keep a centred 5x5 box clear for a logo (version 2 only)
    #[arg(long)]
    logo: bool,

    /// Pixels per module for PNG output, characters per module otherwise
    #[arg(short, long, default_value_t = 1)]
    scale: u32,

    /// Write a PNG here instead of printing to the terminal
    #[arg(short, long)]
    output: Option<String>,
}

fn parse_ec_level(s: &str) -> Result<ECLevel, String> {
    match s.to_uppercase().as_str() {
        "L" => Ok(ECLevel::L),
        "M" => Ok(ECLevel::M),
        "Q" => Ok(ECLevel::Q),
        "H" => Ok(ECLevel::H),
        _ => Err(format!("Invalid ec level: {s}")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let a = Args::parse();

    let mut builder = QRBuilder::new(a.text.as_bytes());
    builder.ec_level(a.ec_level).logo_clearance(a.logo);
    if let Some(v) = a.version {
        builder.version(Version::try_from(v).with_context(|| format!("version {v}"))?);
    }
    if let Some(m) = a.mask {
        builder.mask(MaskPattern::try_from(m).with_context(|| format!("mask {m}"))?);
    }

    let qr = builder.build()?;
    info!(
        version = *qr.version(),
        ec_level = ?qr.ec_level(),
        mask = qr.mask().map(|m| *m),
        "Encoded {} bytes",
        a.text.len()
    );

    match a.output {
        Some(path) => write_png(&qr, a.scale.max(1), &path)?,
        None => println!("{}", qr.to_str(a.scale.max(1) as usize)),
    }

    Ok(())
}

fn write_png(qr: &QR, scale: u32, path: &str) -> Result<()> {
    qr.render(scale).save(path).with_context(|| format!("write: {path}"))?;
    info!(path, "Wrote PNG");
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use clap::Parser;

    use super::{write_png, Args};
    use byteqr::{ECLevel, QRBuilder};

    #[test]
    fn test_defaults() {
        let a = Args::try_parse_from(["byteqr", "Hello"]).unwrap();
        assert_eq!(a.ec_level, ECLevel::L);
        assert_eq!(a.scale, 1);
        assert!(a.version.is_none() && a.mask.is_none() && a.output.is_none());
    }

    #[test]
    fn test_ec_level_case_insensitive() {
        let a = Args::try_parse_from(["byteqr", "Hello", "--ec-level", "q"]).unwrap();
        assert_eq!(a.ec_level, ECLevel::Q);
        assert!(Args::try_parse_from(["byteqr", "Hello", "-e", "X"]).is_err());
    }

    #[test]
    fn test_write_png() {
        let qr = QRBuilder::new(b"Hello").build().unwrap();
        let path = std::env::temp_dir().join("byteqr_cli_write_png.png");
        let path = path.to_str().unwrap();
        write_png(&qr, 2, path).unwrap();
        let img = image::open(path).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (58, 58));
        std::fs::remove_file(path).unwrap();
    }
}
