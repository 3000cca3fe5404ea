//! Minimal inspector.
//!
//! Pass the same module path as the managed process, for instance
//! `cargo run --example inspector -- /tmp/inspector.so`, then start the managed demo.

use std::path::Path;

use vistrigger::{
    handshake::read_call_site,
    launch::handshake_path,
    signal::{DefaultSignal, TriggerSignal},
    TriggerConfig,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::env::args;

    init_tracing();

    let mut args = args();
    args.next();
    let module = args.next().ok_or("module path missing")?;

    let config = TriggerConfig::default();
    let handshake = handshake_path([format!("-agentpath:{module}")], &config)
        .ok_or("module path has no known extension")?;
    println!(
        "Waiting for triggers on {}",
        config.signal_path(&handshake).display()
    );

    let mut exec = futures::executor::LocalPool::new();

    exec.run_until(watch(&handshake, &config))
}

async fn watch(
    handshake: &Path,
    config: &TriggerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let signal_path = config.signal_path(handshake);
    loop {
        DefaultSignal::raised(signal_path.clone()).await?;
        match read_call_site(handshake)? {
            Some(line) => println!("Snapshot requested at line {line}"),
            None => println!("Snapshot requested, call site unknown"),
        }
    }
}
