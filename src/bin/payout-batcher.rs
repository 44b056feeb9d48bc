#[tokio::main]
async fn main() -> anyhow::Result<()> {
    payout_batcher::cli::run().await
}
