use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::AsyncWriteExt;

use nca_decrypt::crypto::header::HEADER_SIZE;
use nca_decrypt::crypto::key_area::KEY_AREA_ENTRY_SIZE;
use nca_decrypt::crypto::xci::XCI_HEADER_SIZE;
use nca_decrypt::crypto::{
    bytes_to_hex, decrypt_header, decrypt_key_area, decrypt_xci_header, hex_to_bytes,
};
use nca_decrypt::{ByteSource, CtrReader, FileSource};

/// CLI arguments. Keys fall back to environment variables (and `.env`).
mod cli {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    #[derive(Parser, Debug)]
    #[command(name = "nca-decrypt", version, about = "Decrypt content archive regions")]
    pub struct Args {
        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Decrypt an AES-128-CTR region into OUTPUT
        Ctr {
            /// Hex-encoded 0x10-byte content key
            #[arg(long, env = "NCA_DECRYPT_KEY", hide_env_values = true)]
            key: String,
            /// Hex-encoded 0x10-byte counter seed
            #[arg(
                long,
                env = "NCA_DECRYPT_COUNTER",
                default_value = "00000000000000000000000000000000"
            )]
            counter: String,
            /// Start of the encrypted region inside INPUT
            #[arg(long, default_value = "0", value_parser = super::parse_u64)]
            base_offset: u64,
            /// Region length (defaults to the rest of INPUT)
            #[arg(long, value_parser = super::parse_u64)]
            length: Option<u64>,
            /// Bytes decrypted per read
            #[arg(long, default_value = "0x100000", value_parser = super::parse_u64)]
            chunk_size: u64,
            input: PathBuf,
            output: PathBuf,
        },
        /// Decrypt the 0xC00-byte XTS header
        Header {
            /// Hex-encoded 0x20-byte header key
            #[arg(long, env = "NCA_DECRYPT_HEADER_KEY", hide_env_values = true)]
            key: String,
            /// Offset of the header inside INPUT
            #[arg(long, default_value = "0", value_parser = super::parse_u64)]
            offset: u64,
            input: PathBuf,
            /// Write raw bytes here instead of printing hex
            output: Option<PathBuf>,
        },
        /// Decrypt a file of consecutive 0x10-byte key area entries
        KeyArea {
            /// Hex-encoded 0x10-byte key area key
            #[arg(long, env = "NCA_DECRYPT_KEY_AREA_KEY", hide_env_values = true)]
            key: String,
            input: PathBuf,
            output: Option<PathBuf>,
        },
        /// Decrypt the 0x70-byte wrapped gamecard header
        XciHeader {
            /// Hex-encoded 0x10-byte key
            #[arg(long, env = "NCA_DECRYPT_XCI_KEY", hide_env_values = true)]
            key: String,
            /// Hex-encoded 0x10-byte IV
            #[arg(long)]
            iv: String,
            /// Offset of the wrapped header inside INPUT
            #[arg(long, default_value = "0", value_parser = super::parse_u64)]
            offset: u64,
            input: PathBuf,
            output: Option<PathBuf>,
        },
    }
}

/// Parse a decimal or `0x`-prefixed hex integer.
fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

fn parse_hex(value: &str, what: &str) -> anyhow::Result<Vec<u8>> {
    hex_to_bytes(value).with_context(|| format!("{} is not valid hex", what))
}

/// Read exactly `size` bytes at `offset`, or fail naming the file.
async fn read_exact_at(path: &Path, offset: u64, size: usize) -> anyhow::Result<Vec<u8>> {
    let source = FileSource::open(path)
        .await
        .with_context(|| format!("opening {:?}", path))?;
    let bytes = source.read(offset, size).await?;
    if bytes.len() < size {
        bail!(
            "{:?}: wanted {:#x} bytes at {:#x}, file has {:#x}",
            path,
            size,
            offset,
            source.size()
        );
    }
    Ok(bytes)
}

/// Format `bytes` as offset-prefixed rows of 16 hex bytes.
fn hex_rows(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(0x10)
        .enumerate()
        .map(|(i, row)| format!("{:08x}: {}", i * 0x10, bytes_to_hex(row)))
        .collect()
}

/// Write raw bytes to `output`, or print them as hex rows.
async fn emit(output: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, bytes)
                .await
                .with_context(|| format!("writing {:?}", path))?;
            log::info!("Wrote {:#x} bytes to {:?}", bytes.len(), path);
        }
        None => {
            for row in hex_rows(bytes) {
                println!("{}", row);
            }
        }
    }
    Ok(())
}

async fn run_ctr(
    key: &str,
    counter: &str,
    base_offset: u64,
    length: Option<u64>,
    chunk_size: u64,
    input: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    if chunk_size == 0 {
        bail!("--chunk-size must be non-zero");
    }
    let key = parse_hex(key, "key")?;
    let counter = parse_hex(counter, "counter")?;

    let source = FileSource::open(input)
        .await
        .with_context(|| format!("opening {:?}", input))?;
    let reader = CtrReader::new(&key, &counter, source)?;
    let reader = match length {
        Some(length) => reader.with_region(base_offset, length)?,
        None => reader.with_base_offset(base_offset)?,
    };

    let mut out = tokio::fs::File::create(output)
        .await
        .with_context(|| format!("creating {:?}", output))?;

    let mut offset = 0u64;
    while offset < reader.len() {
        let n = (reader.len() - offset).min(chunk_size) as usize;
        let chunk = reader
            .read(offset, n)
            .await
            .with_context(|| format!("decrypting {:#x} bytes at {:#x}", n, offset))?;
        out.write_all(&chunk).await?;
        offset += n as u64;
    }
    out.flush().await?;

    log::info!(
        "Decrypted {:#x} bytes from {:?} (base {:#x}) into {:?}",
        reader.len(),
        input,
        base_offset,
        output
    );
    Ok(())
}

async fn run(command: cli::Command) -> anyhow::Result<()> {
    use cli::Command;

    match command {
        Command::Ctr {
            key,
            counter,
            base_offset,
            length,
            chunk_size,
            input,
            output,
        } => {
            run_ctr(
                &key,
                &counter,
                base_offset,
                length,
                chunk_size,
                &input,
                &output,
            )
            .await
        }
        Command::Header {
            key,
            offset,
            input,
            output,
        } => {
            let key = parse_hex(&key, "key")?;
            let header = read_exact_at(&input, offset, HEADER_SIZE).await?;
            let plain = decrypt_header(&key, &header)?;
            emit(output.as_deref(), &plain).await
        }
        Command::KeyArea { key, input, output } => {
            let key = parse_hex(&key, "key")?;
            let area = tokio::fs::read(&input)
                .await
                .with_context(|| format!("reading {:?}", input))?;
            let entries: Vec<&[u8]> = area.chunks(KEY_AREA_ENTRY_SIZE).collect();
            let plain = decrypt_key_area(&key, &entries)?;
            emit(output.as_deref(), &plain.concat()).await
        }
        Command::XciHeader {
            key,
            iv,
            offset,
            input,
            output,
        } => {
            let key = parse_hex(&key, "key")?;
            let iv = parse_hex(&iv, "iv")?;
            let contents = read_exact_at(&input, offset, XCI_HEADER_SIZE).await?;
            let plain = decrypt_xci_header(&key, &iv, &contents)?;
            emit(output.as_deref(), &plain).await
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed flags see it
    let _ = dotenvy::dotenv();

    env_logger::init();

    let args = cli::Args::parse();
    if let Err(e) = run(args.command).await {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
