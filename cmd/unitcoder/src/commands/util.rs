//! Helpers shared by commands.

use tokio_util::sync::CancellationToken;
use unitcoder_cli::{load_config, Config, Context};

use crate::Cli;

pub const APP_NAME: &str = "unitcoder";

/// Loads the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Returns the selected context. Without `-c` and without a current
/// context, an empty context is used so that flags alone suffice.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;
    match (cfg.resolve_context(cli.context.as_deref()), cli.context.as_deref()) {
        (Some(ctx), _) => Ok(ctx.clone()),
        (None, Some(name)) => anyhow::bail!("context '{}' not found", name),
        (None, None) => Ok(Context::default()),
    }
}

/// A token cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing the current file");
            child.cancel();
        }
    });
    token
}

pub fn print_success(message: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", message);
}
