use crate::domain::IdentityRef;

#[derive(Debug, thiserror::Error)]
#[error("identity lookup failed: {0}")]
pub struct IdentityLookupError(pub String);

/// Resolves a phone number to an identity record in the embedding
/// application's user store.
///
/// Which entity and which phone-number column back the lookup is decided once
/// when the implementation is constructed, not re-read per call. A miss is a
/// normal outcome (`Ok(None)`); the webhook engine also absorbs lookup
/// failures, storing the message without an identity reference.
pub trait IdentityResolver: Send + Sync {
    fn find_by_phone(&self, phone: &str) -> Result<Option<IdentityRef>, IdentityLookupError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Resolver that never matches; for deployments without an identity store.
pub struct NullIdentityResolver;

impl IdentityResolver for NullIdentityResolver {
    fn find_by_phone(&self, _phone: &str) -> Result<Option<IdentityRef>, IdentityLookupError> {
        Ok(None)
    }
}
