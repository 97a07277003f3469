use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error code stored when a send failed locally (transport error) rather than
/// with a gateway response code.
pub const LOCAL_FAILURE_ERROR_CODE: i32 = -1;

/// Callback timestamps below this year are treated as absent: the relational
/// storage layers this engine targets cannot represent them, and providers
/// have been observed sending zero-dates for "not yet delivered".
pub const MIN_STORABLE_YEAR: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Lifecycle state of a [`MessageLog`](crate::domain::MessageLog) record.
pub enum DeliveryState {
    /// Outbound record created, no gateway outcome yet.
    Pending,
    /// Gateway accepted the message and assigned an id.
    Sent,
    /// Send rejected, unreachable, or reported failed by a callback.
    Failed,
    /// Delivery callback: the provider is still working on the message.
    Processing,
    /// Delivery callback: the handset confirmed receipt.
    Delivered,
    /// Inbound message stored from a webhook.
    Received,
    /// Delivery callback carried an unrecognized status code.
    Unknown,
}

impl DeliveryState {
    /// Stable lowercase name, as persisted by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Processing => "processing",
            Self::Delivered => "delivered",
            Self::Received => "received",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a PureSMS delivery-status code to a [`DeliveryState`].
///
/// Total over all inputs: any code outside the documented set (including an
/// absent one) maps to [`DeliveryState::Unknown`].
pub fn map_delivery_code(code: Option<i64>) -> DeliveryState {
    match code {
        Some(1) => DeliveryState::Processing,
        Some(2) => DeliveryState::Failed,
        Some(7) => DeliveryState::Delivered,
        _ => DeliveryState::Unknown,
    }
}

/// Normalize a callback timestamp string.
///
/// Accepts RFC 3339 (the documented format) and falls back to a naive
/// `YYYY-MM-DDTHH:MM:SS` reading interpreted as UTC. An unparsable value or a
/// date below [`MIN_STORABLE_YEAR`] yields `None` rather than an error so a
/// bad timestamp never fails the surrounding webhook.
pub fn normalize_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|value| value.and_utc())
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|value| value.and_utc())
        })
        .ok()?;

    if parsed.year() < MIN_STORABLE_YEAR {
        return None;
    }
    Some(parsed)
}
