use contacts_router::config::Config;
use contacts_router::lifecycle::{setup_tracing, ContactsSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = Config::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    let system = ContactsSystem::start(&config).await?;
    info!(addr = %system.local_addr(), "Listening");

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");

    system.shutdown().await?;
    Ok(())
}
