// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # key-did
//!
//! Entry point for the `key-did` binary. Parses CLI arguments, initializes
//! logging, builds the provider from the configured seed and runs one
//! subcommand:
//!
//! - `did`:     print the DID
//! - `send`:    dispatch one JSON-RPC request
//! - `encrypt`: build a JWE addressed to did:key recipients
//! - `keygen`:  generate a new seed
//! - `version`: print build version information

mod cli;
mod logging;
mod seed;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Map;
use zeroize::Zeroizing;

use key_did_provider_ed25519::jose::jwe::{encrypt_jwe, X25519Recipient};
use key_did_provider_ed25519::{DidProvider, Ed25519Provider, Seed};

use cli::{Commands, KeyDidCli};

fn main() -> Result<()> {
    let cli = KeyDidCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Did => {
            let provider = load_provider(&cli.seed)?;
            println!("{}", provider.did());
            Ok(())
        }
        Commands::Send(args) => send(&cli.seed, args),
        Commands::Encrypt(args) => encrypt(args),
        Commands::Keygen(args) => keygen(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn load_provider(args: &cli::SeedArgs) -> Result<Ed25519Provider> {
    let provider = Ed25519Provider::new(seed::resolve_seed(args)?);
    tracing::info!(did = %provider.did(), "provider ready");
    Ok(provider)
}

/// Dispatches one request and prints the response as a single JSON line.
///
/// Error responses are still printed and exit 0: the request was handled.
fn send(seed_args: &cli::SeedArgs, args: cli::SendArgs) -> Result<()> {
    let provider = load_provider(seed_args)?;
    let request = match args.request {
        Some(request) => request,
        None => read_stdin_string()?,
    };

    let response = provider.send_str(&request);
    if let Some(error) = &response.error {
        tracing::warn!(code = error.code, detail = %error.message, "request failed");
    }
    println!(
        "{}",
        serde_json::to_string(&response).context("failed to serialize response")?
    );
    Ok(())
}

/// Encrypts stdin (or the argument) to every `--to` DID and prints the JWE.
fn encrypt(args: cli::EncryptArgs) -> Result<()> {
    let recipients = args
        .to
        .iter()
        .map(|did| {
            X25519Recipient::from_did(did).with_context(|| format!("cannot encrypt to {did}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let cleartext = match args.cleartext {
        Some(text) => text.into_bytes(),
        None => read_stdin_bytes()?,
    };

    let jwe = encrypt_jwe(
        &cleartext,
        &recipients,
        Map::new(),
        args.aad.as_deref().map(str::as_bytes),
    )
    .context("encryption failed")?;
    tracing::info!(recipients = recipients.len(), bytes = cleartext.len(), "JWE built");

    println!(
        "{}",
        serde_json::to_string(&jwe).context("failed to serialize JWE")?
    );
    Ok(())
}

/// Generates a random seed. With `--out` the seed goes to a file and only
/// the DID is printed.
fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let bytes = Zeroizing::new(rand::random::<[u8; 32]>());
    let provider = Ed25519Provider::new(Seed::new(*bytes));

    match &args.out {
        Some(path) => {
            seed::write_seed_file(path, &bytes, args.force)?;
            tracing::info!(path = %path.display(), did = %provider.did(), "seed written");
            println!("{}", provider.did());
        }
        None => {
            let encoded = Zeroizing::new(hex::encode(*bytes));
            println!("seed: {}", encoded.as_str());
            println!("did:  {}", provider.did());
        }
    }
    Ok(())
}

fn read_stdin_bytes() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn read_stdin_string() -> Result<String> {
    String::from_utf8(read_stdin_bytes()?).context("stdin is not valid UTF-8")
}

/// Prints version information to stdout.
fn print_version() {
    println!("key-did {}", env!("CARGO_PKG_VERSION"));
    println!("rustc   {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
