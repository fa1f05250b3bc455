use agent_chat::config::EnvConfig;
use agent_chat::logging;
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let config = EnvConfig::from_env();
    logging::init(&config.log_filter).context("failed to initialise logging")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the event loop")?;
    runtime.block_on(chat_client::runtime::run(config))?;
    Ok(())
}
