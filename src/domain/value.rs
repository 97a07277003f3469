use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// PureSMS API key, sent as the `X-API-Key` request header.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Header name expected by the gateway.
    pub const HEADER: &'static str = "X-API-Key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::HEADER,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Originating sender name (`sender`), an alphanumeric id or a phone number.
///
/// Invariant: non-empty after trimming. The value must be enabled on your
/// PureSMS account.
pub struct SenderName(String);

impl SenderName {
    /// JSON field name used by the gateway (`sender`).
    pub const FIELD: &'static str = "sender";

    /// Create a validated [`SenderName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Destination phone number (`recipient`) as sent to the gateway.
///
/// Invariant: non-empty after trimming. The gateway contract treats numbers as
/// raw strings; no region-aware normalization is applied.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// JSON field name used by the gateway (`recipient`).
    pub const FIELD: &'static str = "recipient";

    /// Create a validated (non-empty) phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to the gateway.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS body text (`content`).
///
/// Invariant: non-empty after trimming. The original value (including
/// whitespace) is preserved.
pub struct MessageContent(String);

impl MessageContent {
    /// JSON field name used by the gateway (`content`).
    pub const FIELD: &'static str = "content";

    /// Create validated message content.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the content as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Validated gateway base URL.
///
/// Invariant: parses as an absolute URL. Any trailing slash is dropped so the
/// API paths can be appended verbatim.
pub struct EndpointUrl(String);

impl EndpointUrl {
    /// Default PureSMS gateway base URL.
    pub const DEFAULT: &'static str = "https://connect-api.divergent.cloud";

    /// Parse and validate an endpoint URL.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "endpoint" });
        }
        url::Url::parse(trimmed).map_err(|_| ValidationError::InvalidEndpoint {
            input: trimmed.to_owned(),
        })?;
        Ok(Self(trimmed.trim_end_matches('/').to_owned()))
    }

    /// Borrow the normalized base URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full URL for an API path relative to this base.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl Default for EndpointUrl {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}
