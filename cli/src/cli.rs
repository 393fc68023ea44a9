//! # CLI Interface
//!
//! Defines the command-line argument structure for `key-did` using `clap`
//! derive. Seed and logging options are global so they can appear before or
//! after the subcommand.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Ed25519 did:key provider.
///
/// Derives a `did:key` from a 32-byte seed and answers DID JSON-RPC
/// requests (`did_createJWS`, `did_decryptJWE`, `did_authenticate`) on the
/// command line. Responses go to stdout, logs to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "key-did",
    about = "Ed25519 did:key provider",
    version,
    propagate_version = true
)]
pub struct KeyDidCli {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// Default log filter. `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, env = "KEY_DID_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the provider's seed comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct SeedArgs {
    /// Hex-encoded 32-byte seed.
    ///
    /// **Avoid on shared machines**: command lines are visible to other
    /// users. Prefer `--seed-file` or the environment variable.
    #[arg(
        long,
        global = true,
        env = "KEY_DID_SEED",
        hide_env_values = true,
        conflicts_with = "seed_file"
    )]
    pub seed: Option<String>,

    /// File holding the seed, as 64 hex characters or 32 raw bytes.
    #[arg(long, global = true, env = "KEY_DID_SEED_FILE")]
    pub seed_file: Option<PathBuf>,
}

/// Top-level subcommands for the `key-did` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the DID for the configured seed.
    Did,
    /// Dispatch one JSON-RPC request and print the response.
    Send(SendArgs),
    /// Encrypt a message to one or more did:key recipients, printing the JWE.
    Encrypt(EncryptArgs),
    /// Generate a fresh random seed and print its DID.
    Keygen(KeygenArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `send` subcommand.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// The JSON-RPC request. Read from stdin when omitted.
    pub request: Option<String>,
}

/// Arguments for the `encrypt` subcommand.
#[derive(Parser, Debug)]
pub struct EncryptArgs {
    /// Recipient DID. Repeat for several recipients.
    #[arg(long = "to", required = true, value_name = "DID")]
    pub to: Vec<String>,

    /// Additional authenticated data, bound to the ciphertext.
    #[arg(long)]
    pub aad: Option<String>,

    /// Cleartext to encrypt. Read from stdin when omitted.
    pub cleartext: Option<String>,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Write the seed (hex) to this file instead of printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Overwrite `--out` if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        KeyDidCli::command().debug_assert();
    }

    #[test]
    fn global_seed_after_subcommand() {
        let cli = KeyDidCli::try_parse_from(["key-did", "did", "--seed", "00"]).unwrap();
        assert_eq!(cli.seed.seed.as_deref(), Some("00"));
        assert!(matches!(cli.command, Commands::Did));
    }

    #[test]
    fn encrypt_requires_recipient() {
        assert!(KeyDidCli::try_parse_from(["key-did", "encrypt", "hello"]).is_err());

        let cli = KeyDidCli::try_parse_from([
            "key-did", "encrypt", "--to", "did:key:a", "--to", "did:key:b", "hello",
        ])
        .unwrap();
        let Commands::Encrypt(args) = cli.command else {
            panic!("expected encrypt");
        };
        assert_eq!(args.to, vec!["did:key:a", "did:key:b"]);
        assert_eq!(args.cleartext.as_deref(), Some("hello"));
    }

    #[test]
    fn log_format_is_a_closed_set() {
        let cli = KeyDidCli::try_parse_from(["key-did", "version"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Pretty);

        let cli = KeyDidCli::try_parse_from(["key-did", "version", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);

        assert!(KeyDidCli::try_parse_from(["key-did", "version", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn seed_and_seed_file_conflict() {
        assert!(KeyDidCli::try_parse_from([
            "key-did",
            "--seed",
            "00",
            "--seed-file",
            "/tmp/seed",
            "did"
        ])
        .is_err());
    }
}
