#[tokio::main]
async fn main() {
    nepsechart::cli::run().await;
}
