//! Extension points around the endpoints.
//!
//! Two mechanisms, both registered up front and never mutated during a request:
//!
//! - [`Hooks`] - callbacks fired at fixed points inside an endpoint
//!   (before/after selection, before/after ranking) with a snapshot of the
//!   media ids involved
//! - [`Interceptor`]s - an ordered chain wrapped around each endpoint call;
//!   `before` runs in registration order and may reject the request, `after`
//!   runs in reverse order with the outcome
use std::fmt;
use std::time::Duration;

use crate::content::MediaId;
use crate::error::CatalogError;

// ============================================================================
// Endpoints and extension points
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Index,
    More,
    Feed,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Index => "index",
            Endpoint::More => "more",
            Endpoint::Feed => "feed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
    BeforeSelection,
    AfterSelection,
    BeforeRanking,
    AfterRanking,
}

/// Snapshot handed to hook callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent {
    pub point: ExtensionPoint,
    pub endpoint: Endpoint,
    /// Slug of the scoped category, if any.
    pub slug: Option<String>,
    /// Ids of the media going into (before) or coming out of (after) the step.
    pub media_ids: Vec<MediaId>,
}

type Callback = Box<dyn Fn(&HookEvent) + Send + Sync>;

/// Registered hook callbacks.
#[derive(Default)]
pub struct Hooks {
    callbacks: Vec<(ExtensionPoint, Callback)>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, point: ExtensionPoint, callback: F)
    where
        F: Fn(&HookEvent) + Send + Sync + 'static,
    {
        self.callbacks.push((point, Box::new(callback)));
    }

    pub fn is_listening(&self, point: ExtensionPoint) -> bool {
        self.callbacks.iter().any(|(p, _)| *p == point)
    }

    /// Invoke the callbacks for `point` in registration order.
    ///
    /// The event is only built when somebody listens.
    pub fn fire<F>(&self, point: ExtensionPoint, event: F)
    where
        F: FnOnce() -> HookEvent,
    {
        if !self.is_listening(point) {
            return;
        }
        let event = event();
        for (_, callback) in self.callbacks.iter().filter(|(p, _)| *p == point) {
            callback(&event);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field(
                "points",
                &self.callbacks.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Interceptors
// ============================================================================

/// What an interceptor sees of an incoming call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub endpoint: Endpoint,
    pub slug: Option<String>,
    /// Raw request parameters other than the slug.
    pub params: Vec<(&'static str, String)>,
}

impl Invocation {
    pub fn new(endpoint: Endpoint, slug: Option<&str>) -> Self {
        Self {
            endpoint,
            slug: slug.map(str::to_string),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }
}

/// How a call ended.
#[derive(Debug)]
pub struct Outcome<'a> {
    /// Number of media in the response, or the error returned.
    pub result: Result<usize, &'a CatalogError>,
    pub elapsed: Duration,
}

pub trait Interceptor: Send + Sync {
    /// Runs before the endpoint; an error rejects the call.
    fn before(&self, _invocation: &Invocation) -> Result<(), CatalogError> {
        Ok(())
    }

    /// Runs after the endpoint, or after a later interceptor rejected the call.
    fn after(&self, _invocation: &Invocation, _outcome: &Outcome<'_>) {}
}

/// Logs every call and its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn before(&self, invocation: &Invocation) -> Result<(), CatalogError> {
        tracing::debug!(
            endpoint = %invocation.endpoint,
            slug = invocation.slug.as_deref().unwrap_or("-"),
            params = ?invocation.params,
            "Handling catalog request"
        );
        Ok(())
    }

    fn after(&self, invocation: &Invocation, outcome: &Outcome<'_>) {
        let elapsed_ms = outcome.elapsed.as_millis() as u64;
        match outcome.result {
            Ok(items) => tracing::info!(
                endpoint = %invocation.endpoint,
                items,
                elapsed_ms,
                "Catalog request served"
            ),
            Err(CatalogError::Integrity(err)) => tracing::warn!(
                endpoint = %invocation.endpoint,
                error = %err,
                "Category data failed integrity checks"
            ),
            Err(err) => tracing::debug!(
                endpoint = %invocation.endpoint,
                error = %err,
                elapsed_ms,
                "Catalog request failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn event(point: ExtensionPoint) -> HookEvent {
        HookEvent {
            point,
            endpoint: Endpoint::Index,
            slug: None,
            media_ids: vec![1, 2],
        }
    }

    #[test]
    fn test_fire_only_matching_point() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::new();
        let sink = Arc::clone(&seen);
        hooks.register(ExtensionPoint::AfterRanking, move |e| {
            sink.lock().unwrap().push(e.point);
        });

        hooks.fire(ExtensionPoint::BeforeRanking, || event(ExtensionPoint::BeforeRanking));
        hooks.fire(ExtensionPoint::AfterRanking, || event(ExtensionPoint::AfterRanking));

        assert_eq!(*seen.lock().unwrap(), vec![ExtensionPoint::AfterRanking]);
    }

    #[test]
    fn test_event_not_built_without_listeners() {
        let hooks = Hooks::new();
        hooks.fire(ExtensionPoint::BeforeSelection, || {
            panic!("event built with no listeners")
        });
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::new();
        for tag in ["first", "second"] {
            let sink = Arc::clone(&seen);
            hooks.register(ExtensionPoint::AfterSelection, move |_| {
                sink.lock().unwrap().push(tag);
            });
        }
        hooks.fire(ExtensionPoint::AfterSelection, || event(ExtensionPoint::AfterSelection));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_invocation_params() {
        let invocation = Invocation::new(Endpoint::More, Some("jazz"))
            .with_param("order", "latest")
            .with_param("page", 2);
        assert_eq!(
            invocation.params,
            vec![("order", "latest".to_string()), ("page", "2".to_string())]
        );
        assert_eq!(invocation.slug.as_deref(), Some("jazz"));
        assert_eq!(invocation.endpoint.to_string(), "more");
    }
}
