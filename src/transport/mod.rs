//! Transport layer: wire-format details (JSON bodies, ack decoding, webhook
//! payload inspection).

mod send;
mod send_bulk;
pub mod webhook;

pub use send::{DecodeError, decode_send_ack, encode_send_body};
pub use send_bulk::{decode_bulk_ack, encode_bulk_body};
