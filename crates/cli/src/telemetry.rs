// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging. Logs go to stderr so `--json` output stays parseable.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "seesaw_kernel=debug,seesaw_persistence=debug,seesaw_cli=debug"
    } else {
        "seesaw_kernel=info,seesaw_persistence=info,seesaw_cli=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
