use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ir_proto::forge;
use std::fs;
use std::path::PathBuf;

mod record;

/// Decodes and synthesizes consumer-infrared remote-control waveforms.
#[derive(Parser, Debug)]
#[command(about, version)]
struct Opt {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a waveform file and print the protocol it matched.
    Analyze {
        /// Raw packed-bitstream waveform file.
        file: PathBuf,

        /// Treat the file as a sequence of persisted variable-shape
        /// records rather than a single raw waveform, decoding each
        /// record's data in turn.
        #[arg(long)]
        records: bool,
    },

    /// Synthesize a waveform and write it to a file.
    Forge {
        #[command(subcommand)]
        format: ForgeFormat,
    },
}

#[derive(Subcommand, Debug)]
enum ForgeFormat {
    /// NEC: 16-bit custom code, 8-bit command.
    Nec {
        #[arg(value_parser = parse_u16)]
        custom: u16,
        #[arg(value_parser = parse_u8)]
        cmd: u8,
        out: PathBuf,
    },
    /// AEHA: 16-bit custom code, up to 28-bit command.
    Aeha {
        #[arg(value_parser = parse_u16)]
        custom: u16,
        #[arg(value_parser = parse_u32)]
        cmd: u32,
        out: PathBuf,
    },
    /// DAIKIN: 16-bit custom code, up to 28-bit command.
    Daikin {
        #[arg(value_parser = parse_u16)]
        custom: u16,
        #[arg(value_parser = parse_u32)]
        cmd: u32,
        out: PathBuf,
    },
    /// SONY: 7-bit command plus an extended product field.
    Sony {
        #[arg(value_parser = parse_u16)]
        prod: u16,
        #[arg(value_parser = parse_u8)]
        cmd: u8,
        out: PathBuf,
    },
}

fn parse_u8(s: &str) -> Result<u8, std::num::ParseIntError> {
    parse_int(s).map(|v: u32| v as u8)
}
fn parse_u16(s: &str) -> Result<u16, std::num::ParseIntError> {
    parse_int(s).map(|v: u32| v as u16)
}
fn parse_u32(s: &str) -> Result<u32, std::num::ParseIntError> {
    parse_int(s)
}

fn parse_int(s: &str) -> Result<u32, std::num::ParseIntError> {
    match s.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

/// Buffers large enough for any built-in format's longest cycle.
const WAVEFORM_BUF_LEN: usize = 2048;

fn main() -> Result<()> {
    let opt = Opt::parse();

    let level = match opt.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    match opt.command {
        Command::Analyze { file, records } => analyze_file(&file, records),
        Command::Forge { format } => forge_to_file(format),
    }
}

fn analyze_file(file: &PathBuf, as_records: bool) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;

    if as_records {
        let mut any = false;
        for rec in record::iter_variable(&data) {
            any = true;
            match ir_proto::analyze(rec.data) {
                Ok(decoded) => println!("type={} {} {}", rec.kind, decoded.tag, decoded.summary),
                Err(_) => println!("type={} <unrecognized waveform>", rec.kind),
            }
        }
        if !any {
            anyhow::bail!("no valid records found in {}", file.display());
        }
    } else {
        match ir_proto::analyze(&data) {
            Ok(decoded) => println!("{} {}", decoded.tag, decoded.summary),
            Err(_) => anyhow::bail!("waveform did not match any registered protocol"),
        }
    }

    Ok(())
}

fn forge_to_file(format: ForgeFormat) -> Result<()> {
    let mut buf = vec![0u8; WAVEFORM_BUF_LEN];

    let out = match format {
        ForgeFormat::Nec { custom, cmd, out } => {
            forge::nec(&mut buf, custom, cmd);
            out
        }
        ForgeFormat::Aeha { custom, cmd, out } => {
            forge::aeha(&mut buf, custom, cmd);
            out
        }
        ForgeFormat::Daikin { custom, cmd, out } => {
            forge::daikin(&mut buf, custom, cmd);
            out
        }
        ForgeFormat::Sony { prod, cmd, out } => {
            forge::sony(&mut buf, prod, cmd);
            out
        }
    };

    fs::write(&out, &buf).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}
