mod configuration;
mod logging;
mod server;

use configuration::Settings;
use toolbox::credentials::CredentialResolver;
use toolbox::tools::Toolbox;

async fn run() -> anyhow::Result<()> {
    let settings = Settings::new()?;
    let _guard = logging::init(&settings.log);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting toolbox MCP server");

    let toolbox = Toolbox::new(settings.into_config(), CredentialResolver::default());
    server::run(toolbox).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Failed to start MCP server: {:#}", err);
        std::process::exit(1);
    }
}
