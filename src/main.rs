#[tokio::main]
async fn main() -> std::io::Result<()> {
    ball_pool::run_with_config().await
}
