//! Navigation router.
//!
//! Maps triggers to [`NavigationTarget`]s and applies them through a
//! [`Navigator`]. Until the navigation layer reports ready, requests are held
//! back: only the latest one per trigger kind survives, and they are applied
//! in arrival order on [`NavigationRouter::mark_ready`].

use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use notiflow_core::types::{DeepLinkResult, NavigationTarget, NotificationRecord, Screen};

/// Something that asks for a screen change.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTrigger {
    /// A notification was opened.
    Notification(NotificationRecord),
    /// A payment-result deep link was opened.
    DeepLink(DeepLinkResult),
}

/// Trigger kinds; the pending queue keeps one request per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Notification open.
    Notification,
    /// Deep link open.
    DeepLink,
}

impl TriggerKind {
    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::DeepLink => "deep_link",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RouteTrigger {
    /// Kind of this trigger.
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Notification(_) => TriggerKind::Notification,
            Self::DeepLink(_) => TriggerKind::DeepLink,
        }
    }
}

/// Resolves a trigger to its destination.
///
/// Records carrying an order id open order tracking, other records open the
/// notifications list. Deep links open the payment result only when valid.
pub fn resolve(trigger: &RouteTrigger) -> Option<NavigationTarget> {
    match trigger {
        RouteTrigger::Notification(record) => match record.target_screen() {
            Screen::OrderTracking => record.order_id().map(|order_id| {
                NavigationTarget::OrderTracking {
                    order_id: order_id.to_string(),
                }
            }),
            _ => Some(NavigationTarget::Notifications),
        },
        RouteTrigger::DeepLink(result) if result.is_valid() => {
            Some(NavigationTarget::PaymentResult(result.clone()))
        }
        RouteTrigger::DeepLink(result) => {
            warn!(
                order_id = ?result.order_id,
                status = ?result.status,
                "Dropping invalid payment-result link"
            );
            None
        }
    }
}

/// The external navigation layer.
pub trait Navigator: Send + Sync + Debug {
    /// Show the target screen.
    fn navigate(&self, target: &NavigationTarget);
}

/// Navigator that only logs.
#[derive(Debug, Clone, Default)]
pub struct LogNavigator;

impl LogNavigator {
    /// Creates a log navigator.
    pub fn new() -> Self {
        Self
    }
}

impl Navigator for LogNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        info!(screen = %target.screen(), params = %target.params(), "Navigate");
    }
}

/// Whether the navigation layer can accept requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationReadiness {
    /// Requests are queued.
    #[default]
    NotReady,
    /// Requests are applied immediately.
    Ready,
}

#[derive(Debug, Default)]
struct RouterState {
    readiness: NavigationReadiness,
    pending: Vec<(TriggerKind, NavigationTarget)>,
}

/// Applies resolved targets, queueing them until ready.
#[derive(Debug)]
pub struct NavigationRouter {
    navigator: Arc<dyn Navigator>,
    state: Mutex<RouterState>,
}

impl NavigationRouter {
    /// Creates a router in the not-ready state.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            state: Mutex::new(RouterState::default()),
        }
    }

    /// Current readiness.
    pub fn readiness(&self) -> NavigationReadiness {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).readiness
    }

    /// Number of queued requests.
    pub fn pending_len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).pending.len()
    }

    /// Resolve and apply a trigger, or queue it while not ready.
    ///
    /// Returns the resolved target; `None` means the trigger was dropped.
    pub fn route(&self, trigger: RouteTrigger) -> Option<NavigationTarget> {
        let kind = trigger.kind();
        let target = resolve(&trigger)?;

        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.readiness == NavigationReadiness::NotReady {
                state.pending.retain(|(queued, _)| *queued != kind);
                state.pending.push((kind, target.clone()));
                debug!(kind = %kind, screen = %target.screen(), "Navigation not ready, queued");
                return Some(target);
            }
        }

        // The navigator may call back into the router.
        debug!(kind = %kind, screen = %target.screen(), "Routing");
        self.navigator.navigate(&target);
        Some(target)
    }

    /// Mark the navigation layer ready and flush queued requests.
    ///
    /// Returns how many requests were flushed.
    pub fn mark_ready(&self) -> usize {
        let pending = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.readiness == NavigationReadiness::Ready {
                return 0;
            }
            state.readiness = NavigationReadiness::Ready;
            std::mem::take(&mut state.pending)
        };

        for (_, target) in &pending {
            self.navigator.navigate(target);
        }
        info!(flushed = pending.len(), "Navigation ready");
        pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Default)]
    struct RecordingNavigator {
        seen: Mutex<Vec<NavigationTarget>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, target: &NavigationTarget) {
            self.seen.lock().unwrap().push(target.clone());
        }
    }

    fn record(id: &str, order_id: Option<&str>) -> NotificationRecord {
        let mut attributes = BTreeMap::new();
        if let Some(order_id) = order_id {
            attributes.insert("orderId".to_string(), order_id.to_string());
        }
        NotificationRecord::new(id, "t", "b", attributes)
    }

    #[test]
    fn test_resolve_priority() {
        assert_eq!(
            resolve(&RouteTrigger::Notification(record("1", Some("ORD-1")))),
            Some(NavigationTarget::OrderTracking {
                order_id: "ORD-1".into()
            })
        );
        assert_eq!(
            resolve(&RouteTrigger::Notification(record("2", None))),
            Some(NavigationTarget::Notifications)
        );

        let valid = DeepLinkResult::new("ORD-2", "success");
        assert_eq!(
            resolve(&RouteTrigger::DeepLink(valid.clone())),
            Some(NavigationTarget::PaymentResult(valid))
        );

        let invalid = DeepLinkResult {
            status: Some("success".into()),
            ..DeepLinkResult::default()
        };
        assert_eq!(resolve(&RouteTrigger::DeepLink(invalid)), None);
    }

    #[test]
    fn test_ready_router_navigates_immediately() {
        let navigator = Arc::new(RecordingNavigator::default());
        let router = NavigationRouter::new(navigator.clone());
        router.mark_ready();

        router.route(RouteTrigger::Notification(record("1", Some("ORD-1"))));
        assert_eq!(navigator.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_queue_keeps_latest_per_kind_in_arrival_order() {
        let navigator = Arc::new(RecordingNavigator::default());
        let router = NavigationRouter::new(navigator.clone());
        assert_eq!(router.readiness(), NavigationReadiness::NotReady);

        router.route(RouteTrigger::Notification(record("1", Some("ORD-1"))));
        router.route(RouteTrigger::DeepLink(DeepLinkResult::new("ORD-P", "success")));
        router.route(RouteTrigger::Notification(record("2", None)));
        assert!(navigator.seen.lock().unwrap().is_empty());
        assert_eq!(router.pending_len(), 2);

        assert_eq!(router.mark_ready(), 2);
        let seen = navigator.seen.lock().unwrap();
        assert_eq!(seen[0].screen(), Screen::PaymentResult);
        assert_eq!(seen[1], NavigationTarget::Notifications);
    }

    #[test]
    fn test_invalid_link_is_not_queued() {
        let navigator = Arc::new(RecordingNavigator::default());
        let router = NavigationRouter::new(navigator.clone());

        let invalid = DeepLinkResult {
            order_id: Some("ORD-1".into()),
            ..DeepLinkResult::default()
        };
        assert_eq!(router.route(RouteTrigger::DeepLink(invalid)), None);
        assert_eq!(router.mark_ready(), 0);
        assert!(navigator.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mark_ready_twice_flushes_once() {
        let navigator = Arc::new(RecordingNavigator::default());
        let router = NavigationRouter::new(navigator.clone());
        router.route(RouteTrigger::Notification(record("1", None)));
        assert_eq!(router.mark_ready(), 1);
        assert_eq!(router.mark_ready(), 0);
        assert_eq!(navigator.seen.lock().unwrap().len(), 1);
    }

    /// Reads router state from inside `navigate`, the way a screen stack
    /// that checks readiness on every push would.
    #[derive(Debug, Default)]
    struct ReentrantNavigator {
        router: std::sync::OnceLock<std::sync::Weak<NavigationRouter>>,
        observed: Mutex<Vec<(NavigationReadiness, usize)>>,
    }

    impl Navigator for ReentrantNavigator {
        fn navigate(&self, _target: &NavigationTarget) {
            if let Some(router) = self.router.get().and_then(|r| r.upgrade()) {
                let snapshot = (router.readiness(), router.pending_len());
                self.observed.lock().unwrap().push(snapshot);
            }
        }
    }

    #[test]
    fn test_navigator_may_call_back_into_router() {
        let navigator = Arc::new(ReentrantNavigator::default());
        let router = Arc::new(NavigationRouter::new(navigator.clone()));
        navigator.router.set(Arc::downgrade(&router)).unwrap();

        router.route(RouteTrigger::Notification(record("1", Some("ORD-1"))));
        assert_eq!(router.mark_ready(), 1);
        router.route(RouteTrigger::Notification(record("2", None)));

        let observed = navigator.observed.lock().unwrap();
        assert_eq!(
            *observed,
            vec![
                (NavigationReadiness::Ready, 0),
                (NavigationReadiness::Ready, 0)
            ]
        );
    }
}
