use anyhow::Context;
use atelier::kernel::config::load_config;
use atelier_logger::Logger;
use atelier_runtime::RuntimeConfig;
use atelier_server::Server;

fn main() -> anyhow::Result<()> {
    let runtime = atelier_runtime::build_runtime_with_config(&RuntimeConfig::high_performance())?;

    runtime.block_on(async {
        let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

        let cfg = load_config(Some("server")).context("Critical: Configuration is malformed")?;

        Server::builder().config(cfg).build().await?.run().await
    })
}
