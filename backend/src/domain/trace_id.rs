//! Correlation id attached to every request the service handles.
//!
//! The `Trace` middleware resolves one id per request, runs the handler in
//! its scope, and echoes it in the `trace-id` response header. Domain errors
//! built inside that scope copy it into their `traceId` field, so a client
//! report and the server log line can be matched.
//!
//! The id lives in Tokio task-local storage and is not inherited by spawned
//! tasks; wrap such work in [`TraceId::scope`].

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Request and response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static TRACE_ID: TraceId;
}

/// Per-request correlation id.
///
/// # Examples
/// ```
/// use recipes::domain::TraceId;
///
/// let reused = TraceId::resolve(Some("9b2e4c1a-5f3d-4e8a-b6c7-0d1e2f3a4b5c"));
/// assert_eq!(reused.to_string(), "9b2e4c1a-5f3d-4e8a-b6c7-0d1e2f3a4b5c");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied `trace-id` header value.
    ///
    /// Surrounding whitespace is ignored. Anything that is not a UUID, and
    /// the nil UUID, yields `None`.
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim())
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }

    /// Reuse the caller's id when it is usable, otherwise mint one.
    #[must_use]
    pub fn resolve(header: Option<&str>) -> Self {
        header
            .and_then(Self::from_header)
            .unwrap_or_else(Self::generate)
    }

    /// The id of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CLIENT_ID: &str = "9b2e4c1a-5f3d-4e8a-b6c7-0d1e2f3a4b5c";

    #[rstest]
    #[case(CLIENT_ID)]
    #[case("  9b2e4c1a-5f3d-4e8a-b6c7-0d1e2f3a4b5c\t")]
    #[case("9B2E4C1A-5F3D-4E8A-B6C7-0D1E2F3A4B5C")]
    fn client_ids_are_reused(#[case] header: &str) {
        assert_eq!(TraceId::resolve(Some(header)).to_string(), CLIENT_ID);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("req-42"))]
    #[case(Some("00000000-0000-0000-0000-000000000000"))]
    fn unusable_headers_get_a_fresh_id(#[case] header: Option<&str>) {
        let first = TraceId::resolve(header);
        let second = TraceId::resolve(header);
        assert_ne!(first, second);
        assert_ne!(first.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[tokio::test]
    async fn errors_raised_in_scope_carry_the_id() {
        let id = TraceId::resolve(Some(CLIENT_ID));
        let error = TraceId::scope(id, async { crate::domain::Error::not_found("no recipe") }).await;
        assert_eq!(error.trace_id(), Some(CLIENT_ID));
    }

    #[tokio::test]
    async fn nothing_is_current_outside_a_request() {
        assert!(TraceId::current().is_none());
        assert!(crate::domain::Error::not_found("no recipe").trace_id().is_none());
    }
}
