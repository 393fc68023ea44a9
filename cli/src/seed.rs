//! Seed loading and storage for the CLI.
//!
//! Seed files hold either 64 hex characters (surrounding whitespace is
//! fine) or exactly 32 raw bytes. Files we write are hex, mode `0600` on
//! Unix.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use key_did_provider_ed25519::config::SEED_LENGTH;
use key_did_provider_ed25519::Seed;
use zeroize::Zeroizing;

use crate::cli::SeedArgs;

/// Resolve the configured seed. `--seed` wins over `--seed-file`.
pub fn resolve_seed(args: &SeedArgs) -> Result<Seed> {
    match (&args.seed, &args.seed_file) {
        (Some(hex_seed), _) => Seed::from_hex(hex_seed).context("invalid --seed / KEY_DID_SEED"),
        (None, Some(path)) => read_seed_file(path),
        (None, None) => bail!(
            "no seed configured: pass --seed or --seed-file, or set KEY_DID_SEED / KEY_DID_SEED_FILE"
        ),
    }
}

/// Read a seed file, hex or raw.
pub fn read_seed_file(path: &Path) -> Result<Seed> {
    let contents = Zeroizing::new(
        fs::read(path).with_context(|| format!("failed to read seed file {}", path.display()))?,
    );

    if contents.len() == SEED_LENGTH {
        return Seed::from_slice(&contents)
            .with_context(|| format!("invalid seed in {}", path.display()));
    }

    let text = std::str::from_utf8(&contents)
        .with_context(|| format!("seed file {} is neither hex nor 32 raw bytes", path.display()))?;
    Seed::from_hex(text).with_context(|| format!("invalid seed in {}", path.display()))
}

/// Write `seed` as hex to `path`, refusing to clobber an existing file
/// unless `force` is set.
///
/// Without `force` the file is created exclusively, so an existing path
/// (symlinks included) is never opened. On Unix the file is created with
/// mode `0600`; an overwritten file is narrowed to `0600` before the seed
/// goes in.
pub fn write_seed_file(path: &Path, seed: &[u8; SEED_LENGTH], force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).truncate(true);
    if force {
        options.create(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("{} already exists (use --force to overwrite)", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create seed file {}", path.display()))
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }

    let encoded = Zeroizing::new(hex::encode(seed));
    file.write_all(encoded.as_bytes())
        .with_context(|| format!("failed to write seed to {}", path.display()))?;
    Ok(())
}
