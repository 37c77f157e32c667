//! `autoprefs` command-line entry point.
//!
//! # Environment variable overrides
//!
//! | Variable                  | Default                                  |
//! |---------------------------|------------------------------------------|
//! | `AUTOPREFS_LOCAL_DIR`     | current working directory                |
//! | `AUTOPREFS_HOME_DIR`      | `HOME` (`USERPROFILE` on Windows)        |
//! | `AUTOPREFS_REGISTRY_ROOT` | `<platform config dir>/autoprefs/registry` |
//! | `RUST_LOG`                | `warn`                                   |
//!
//! Flags take precedence over the variables.

use autoprefs_cli::{run, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // Logs go to stderr so command output on stdout stays scriptable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock())
}
