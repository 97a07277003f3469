#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Decoded body of a successful `sms/send` response.
///
/// The gateway is expected to return an assigned message id; a 2xx response
/// without one is treated as a semantic send failure by the dispatcher.
pub struct SendAck {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Decoded body of a successful `sms/send/bulk` response.
pub struct BulkAck {
    pub batch_id: Option<String>,
    pub message_count: Option<u64>,
}
