use spendtrack_cli::{app, config, error::Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (config, command) = config::load()?;
    let app = app::App::new(config)?;
    app.run(command).await?;
    Ok(())
}
