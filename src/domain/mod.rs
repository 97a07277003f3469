//! Domain layer: strong types with validation and invariants (no I/O).

mod log;
mod request;
mod response;
mod status;
mod validation;
mod value;

pub use log::{IdentityRef, MessageLog, NewMessageLog, StatusUpdate};
pub use request::{BulkRequest, SEND_BULK_MAX_MESSAGES, SendRequest};
pub use response::{BulkAck, SendAck};
pub use status::{
    DeliveryState, LOCAL_FAILURE_ERROR_CODE, MIN_STORABLE_YEAR, map_delivery_code,
    normalize_timestamp,
};
pub use validation::ValidationError;
pub use value::{ApiKey, EndpointUrl, MessageContent, PhoneNumber, SenderName};
