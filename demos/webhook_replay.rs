//! Feed a webhook payload (JSON on stdin) through the processor twice and
//! print both dispositions; handy for checking idempotency against captured
//! provider traffic.

use std::io::Read;
use std::sync::Arc;

use puresms::{InMemoryLogStore, NullIdentityResolver, WebhookProcessor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;

    let store = Arc::new(InMemoryLogStore::new());
    let processor = WebhookProcessor::new(store.clone(), Arc::new(NullIdentityResolver));

    let first = processor.handle(&payload)?;
    let second = processor.handle(&payload)?;
    println!("first delivery:  {first:?}");
    println!("second delivery: {second:?}");
    println!("records stored:  {}", store.len()?);

    Ok(())
}
