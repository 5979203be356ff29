// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Installs the compact fmt subscriber. `RUST_LOG` wins over `fallback`.
/// Calling this twice is harmless; the second install is ignored.
pub fn init_tracing_with(fallback: &str) {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
