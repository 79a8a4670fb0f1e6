#[tokio::main]
async fn main() {
    gatehouse_server::start_server().await;
}
