//! Process to inspect.
//!
//! Run it with the inspector argument, for instance
//! `cargo run --example managed -- -agentpath:/tmp/inspector.so`.

use std::time::Duration;

use vistrigger::{metrics::MetricsSnapshot, visualize};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    init_tracing();

    println!("PID: {}", std::process::id());

    for round in 0..10u32 {
        visualize();
        tracing::info!(round, "snapshot requested");
        std::thread::sleep(Duration::from_secs(1));
    }

    println!("{}", MetricsSnapshot::capture());
}
