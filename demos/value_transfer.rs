//! Network communication requires `http` crate feature (enabled by default).
//!
//! Expects `STRATO_URL`, `STRATO_TOKEN` and `TEST_TO_ADDRESS` in the environment.

use strato_rest::{Address, Config, Options, Result, StratoClient, TransferPayload, TxStatus, User};

async fn create_and_send_transfer() -> Result<()> {
    let url = std::env::var("STRATO_URL").expect("Node url must be provided");
    let options = Options::new(Config::default().with_node(url.parse()?));
    let client = StratoClient::new();

    let token = std::env::var("STRATO_TOKEN").expect("Token must be provided");
    let user = User::new(token);
    let sender = match client.get_key(&user, &options).await {
        Ok(address) => address,
        Err(err) if err.status() == Some(400) => client.create_key(&user, &options).await?,
        Err(err) => return Err(err),
    };
    let recipient: Address = std::env::var("TEST_TO_ADDRESS")
        .expect("Address must be provided")
        .parse()?;
    println!("Sending from {} to {}", sender.to_hex(), recipient.to_hex());

    let sender_before = client.get_account(&user, sender, &options).await?;
    println!("Sender before: {sender_before:?}");

    let result = client
        .send(&user, &TransferPayload::new(recipient, 10u32), &options)
        .await?;
    assert_eq!(result.status, TxStatus::Success);
    println!("Transaction {} finalized", result.hash);

    let sender_after = client.get_account(&user, sender, &options).await?;
    println!("Sender after: {sender_after:?}");
    Ok(())
}

#[tokio::main]
async fn main() {
    create_and_send_transfer().await.expect("Must not fail");
}
