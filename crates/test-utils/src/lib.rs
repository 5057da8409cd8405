//! Test doubles and helpers shared by the `dagremote` integration tests.

pub mod builders;
pub mod fake_controller;
pub mod fake_dag;
pub mod recording_publisher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use dagremote::logging::{LOG_ENV, filter_directives};
use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single async test step.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness.
///
/// Output is captured per test and shown only for failures (or with
/// `--nocapture`). The filter is read from `DAGREMOTE_LOG`, then
/// `RUST_LOG`, e.g. `DAGREMOTE_LOG=dagremote=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok();
        let directives = filter_directives(None, env.as_deref());
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test did not finish within {TEST_TIMEOUT:?}"))
}
