// # IP Source Trait
//
// Defines the interface for discovering the caller's current public IP.
//
// ## Implementations
//
// - HTTP "what is my IP" endpoints: `cfddns-ip-http` crate
//
// ## Contract
//
// `current()` is a single discovery attempt. Implementations may fail over
// across their own sources internally, but must not retry the whole pass;
// retry, if desired, happens via the outer scheduler's next interval.
//
// The returned value is the trimmed response body as-is. No IP-syntax
// validation is performed anywhere in the pipeline; the provider API is the
// authority on whether the content is acceptable.

use async_trait::async_trait;

/// Trait for public IP discovery implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Discover the current public IP
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The trimmed IP text from the first responding source
    /// - `Err(Error::NoPublicIp)`: Every source failed
    async fn current(&self) -> crate::Result<String>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
