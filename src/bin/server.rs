use anyhow::Result;
use paper_checker::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    paper_checker::utils::logging::init(config.verbose_logging);

    paper_checker::server::serve(config).await?;

    Ok(())
}
