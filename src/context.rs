/// Request-scoped execution context
///
/// Every read performed by this crate is scoped by a [`RequestContext`]. The
/// context is created by the surrounding system (HTTP layer, job runner,
/// test harness), carries the tenant/channel boundary for the request, and
/// is threaded through unchanged — this crate never mutates or persists it,
/// and never opens or closes the transaction the context is bound to.
///
/// # Example
///
/// ```
/// use credence::RequestContext;
/// use uuid::Uuid;
///
/// let channel = Uuid::new_v4();
/// let ctx = RequestContext::new(channel);
/// assert_eq!(ctx.channel_id(), channel);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque scoping handle passed through all read operations.
///
/// Cloning is cheap; the context holds no connections itself. Transaction
/// binding, where present, is managed by the store implementation the
/// surrounding system wired in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Channel (tenant) the request is scoped to
    channel_id: Uuid,

    /// Correlation id for log lines emitted while serving this request
    request_id: Uuid,
}

impl RequestContext {
    /// Creates a context scoped to the given channel with a fresh request id.
    pub fn new(channel_id: Uuid) -> Self {
        Self {
            channel_id,
            request_id: Uuid::new_v4(),
        }
    }

    /// Creates a context with an explicit request id (e.g. propagated from
    /// an upstream trace header).
    pub fn with_request_id(channel_id: Uuid, request_id: Uuid) -> Self {
        Self {
            channel_id,
            request_id,
        }
    }

    /// Channel (tenant) boundary for every read made under this context.
    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    /// Correlation id for logging.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}
