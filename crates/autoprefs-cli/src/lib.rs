//! Command-line front end for `autoprefs` preference stores.
//!
//! The binary in `main.rs` only installs logging and parses arguments; the
//! command handling lives here so integration tests can drive it with an
//! in-memory output buffer.
//!
//! # Usage
//!
//! ```text
//! autoprefs [OPTIONS] <COMMAND>
//!
//! Commands:
//!   which   <NAMESPACE>                         Show the selected backend
//!   list    <NAMESPACE>                         Print every entry
//!   get     <NAMESPACE> <KEY> [--default V]     Print one value
//!   set     <NAMESPACE> <KEY> <VALUE> [--type T]
//!   remove  <NAMESPACE> <KEY>
//!   clear   <NAMESPACE>
//!   migrate <NAMESPACE> --to <KIND> [--clear-source]
//!
//! Options:
//!   --backend       <KIND>  local | home | native (default: auto-select)
//!   --local-dir     <DIR>   Local preference directory [env: AUTOPREFS_LOCAL_DIR]
//!   --home-dir      <DIR>   Home preference directory  [env: AUTOPREFS_HOME_DIR]
//!   --registry-root <DIR>   Native registry root       [env: AUTOPREFS_REGISTRY_ROOT]
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use autoprefs::config::{default_registry_root, home_dir};
use autoprefs::{
    BackendKind, Namespace, Preferences, PreferencesConfig, RegistryConfig, Value, ValueType,
};
use clap::{Parser, Subcommand};
use tracing::debug;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit typed application preferences.
#[derive(Debug, Parser)]
#[command(
    name = "autoprefs",
    about = "Inspect and edit typed preferences in local files, home files, or the native store",
    version
)]
pub struct Cli {
    /// Backend to open instead of auto-selecting one.
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Directory holding local preference files.
    ///
    /// Defaults to the current working directory.
    #[arg(long, global = true, env = "AUTOPREFS_LOCAL_DIR")]
    pub local_dir: Option<PathBuf>,

    /// Directory holding home preference files.
    ///
    /// Defaults to the user's home directory.
    #[arg(long, global = true, env = "AUTOPREFS_HOME_DIR")]
    pub home_dir: Option<PathBuf>,

    /// Root directory of the native registry.
    ///
    /// Defaults to `autoprefs/registry` under the platform configuration
    /// directory.
    #[arg(long, global = true, env = "AUTOPREFS_REGISTRY_ROOT")]
    pub registry_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the backend kind and location the namespace resolves to.
    Which { namespace: String },

    /// Print every entry as `key = value (type)`, sorted by key.
    List { namespace: String },

    /// Print the value stored under a key.
    Get {
        namespace: String,
        key: String,
        /// Printed when the key is not set, instead of failing.
        #[arg(long)]
        default: Option<String>,
    },

    /// Store a value under a key.
    Set {
        namespace: String,
        key: String,
        value: String,
        /// Stored type: bool, int, long, float, double, string, bytes (hex), opaque (hex).
        #[arg(long = "type", default_value = "string")]
        value_type: ValueType,
    },

    /// Delete one key.
    Remove { namespace: String, key: String },

    /// Delete every entry of the namespace.
    Clear { namespace: String },

    /// Copy every entry into another backend.
    Migrate {
        namespace: String,
        /// Destination backend.
        #[arg(long)]
        to: BackendKind,
        /// Clear the source store after a successful copy.
        #[arg(long)]
        clear_source: bool,
    },
}

impl Cli {
    /// Resolves store locations from the flags, falling back to the process
    /// environment for anything not given.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory or the platform
    /// configuration directory is needed and cannot be determined.
    pub fn preferences_config(&self) -> anyhow::Result<PreferencesConfig> {
        let local_dir = match &self.local_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("cannot read the current working directory")?,
        };
        let registry_root = match &self.registry_root {
            Some(root) => root.clone(),
            None => default_registry_root().context(
                "cannot determine the platform configuration directory; pass --registry-root",
            )?,
        };
        let home = self.home_dir.clone().or_else(home_dir);

        Ok(PreferencesConfig::new(
            local_dir,
            home,
            RegistryConfig::Filesystem(registry_root),
        ))
    }
}

impl Command {
    fn namespace(&self) -> &str {
        match self {
            Command::Which { namespace }
            | Command::List { namespace }
            | Command::Get { namespace, .. }
            | Command::Set { namespace, .. }
            | Command::Remove { namespace, .. }
            | Command::Clear { namespace }
            | Command::Migrate { namespace, .. } => namespace.as_str(),
        }
    }
}

// ── Command execution ─────────────────────────────────────────────────────────

/// Executes `cli`, writing human-readable results to `out`.
///
/// # Errors
///
/// Returns an error if the namespace is invalid, the store cannot be opened,
/// a requested key is missing without `--default`, or any store operation
/// fails.  Each error carries the namespace or key it concerns.
pub fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = cli.preferences_config()?;
    let namespace: Namespace = cli
        .command
        .namespace()
        .parse()
        .with_context(|| format!("invalid namespace '{}'", cli.command.namespace()))?;
    debug!(?config, %namespace, "resolved preference locations");

    let mut prefs = Preferences::open_in(config, namespace.clone(), cli.backend)
        .with_context(|| format!("cannot open preferences for '{namespace}'"))?;

    match cli.command {
        Command::Which { .. } => {
            writeln!(out, "{}\t{}", prefs.kind(), prefs.location())?;
        }
        Command::List { .. } => {
            let entries = prefs
                .entries()
                .with_context(|| format!("cannot list preferences for '{namespace}'"))?;
            for (key, value) in entries {
                writeln!(out, "{key} = {value} ({})", value.value_type())?;
            }
        }
        Command::Get { key, default, .. } => {
            let value = prefs
                .raw(&key)
                .with_context(|| format!("cannot read '{key}' from '{namespace}'"))?;
            match (value, default) {
                (Some(value), _) => writeln!(out, "{value}")?,
                (None, Some(default)) => writeln!(out, "{default}")?,
                (None, None) => bail!("'{key}' is not set in '{namespace}'"),
            }
        }
        Command::Set {
            key,
            value,
            value_type,
            ..
        } => {
            let value = Value::parse_as(value_type, &value)
                .with_context(|| format!("cannot store '{key}'"))?;
            prefs
                .put(&key, value)
                .with_context(|| format!("cannot write '{key}' to {}", prefs.location()))?;
        }
        Command::Remove { key, .. } => {
            let removed = prefs
                .remove(&key)
                .with_context(|| format!("cannot remove '{key}' from '{namespace}'"))?;
            if !removed {
                writeln!(out, "'{key}' was not set")?;
            }
        }
        Command::Clear { .. } => {
            prefs
                .clear()
                .with_context(|| format!("cannot clear {}", prefs.location()))?;
        }
        Command::Migrate {
            to, clear_source, ..
        } => {
            let from = prefs.kind();
            let entries = prefs
                .keys()
                .with_context(|| format!("cannot list preferences for '{namespace}'"))?
                .len();
            let migrated = if clear_source {
                prefs.migrate_and_clear(to)
            } else {
                prefs.migrate(to)
            }
            .with_context(|| format!("cannot migrate '{namespace}' from {from} to {to}"))?;
            writeln!(
                out,
                "migrated {entries} entries from {from} to {to} ({})",
                migrated.location()
            )?;
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
