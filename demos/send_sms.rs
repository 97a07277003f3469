use std::io;
use std::sync::Arc;

use puresms::{
    ApiKey, GatewayClient, InMemoryLogStore, MessageContent, OutboundMessage, PhoneNumber,
    SendDispatcher, SenderName,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("PURESMS_API_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "PURESMS_API_KEY environment variable is required",
        )
    })?;
    let recipient = std::env::var("PURESMS_RECIPIENT").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "PURESMS_RECIPIENT environment variable is required",
        )
    })?;
    let sender = std::env::var("PURESMS_SENDER").unwrap_or_else(|_| "PureSMS".to_owned());
    let message = std::env::var("PURESMS_MESSAGE")
        .unwrap_or_else(|_| "Hello from the puresms demo.".to_owned());

    let store = Arc::new(InMemoryLogStore::new());
    let dispatcher = SendDispatcher::new(
        Arc::new(GatewayClient::new(ApiKey::new(api_key)?)),
        store.clone(),
        SenderName::new(sender)?,
    );

    let receipt = dispatcher
        .send_one(OutboundMessage::new(
            PhoneNumber::new(recipient)?,
            MessageContent::new(message)?,
        ))
        .await?;
    println!(
        "message_id: {}, status: {}, http: {}",
        receipt.message_id, receipt.status, receipt.response.status
    );

    for record in store.records()? {
        println!(
            "log #{}: external={:?} status={}",
            record.id, record.external_message_id, record.status
        );
    }

    Ok(())
}
