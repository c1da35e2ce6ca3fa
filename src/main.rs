#[tokio::main]
async fn main() {
    bodega::start_server().await;
}
