use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    autoconsent_cli::cli::app::run().await
}
