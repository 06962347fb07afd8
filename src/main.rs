use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    popcorn_picks::app::run().await
}
