#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scholarship_rag_server::start().await
}
