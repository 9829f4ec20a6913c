use ferry_core::Config;

// mimalloc keeps fragmentation low under many concurrent uploads
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Initialize the application (database, storage, services, routes)
    let (_state, router) = ferry_api::setup::initialize_app(config.clone()).await?;

    ferry_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
