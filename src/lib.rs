#![doc(test(attr(deny(warnings))))]

//! Envelope Budget keeps a client-side view of category balances and the Ready to
//! Assign pool, applying money moves optimistically and rolling them back when the
//! budgeting API rejects them.

pub mod errors;
pub mod session;
pub mod utils;

pub use envelope_config as config;
pub use envelope_core as engine;
pub use envelope_domain as domain;

pub use errors::SessionError;
pub use session::BudgetSession;

use std::sync::Once;

use envelope_config::Config;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and logs build metadata.
pub fn init() {
    init_with_config(&Config::default());
}

/// Initializes global tracing using the configured default directive.
pub fn init_with_config(config: &Config) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(&config.log_filter);
        let build = utils::build_info::current();
        tracing::info!(
            "Envelope Budget {} ({}, {}) tracing initialized.",
            build.version,
            build.git_hash,
            build.profile
        );
    });
}
