use tracing_subscriber::EnvFilter;

/// Routes the crate's tracing output through the test harness. Filter with `RUST_LOG`.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
