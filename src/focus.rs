//! Focus Coordinator
//!
//! After a drag, archive, delete, or creation the element that should
//! hold focus may not exist in the render tree yet. Focus acquisition is
//! therefore a bounded retry: attempt, yield for a fixed interval, try
//! again, and give up with a sentinel (never an error) once the attempt
//! budget runs out.

use std::sync::Arc;

use log::debug;

use crate::config::BoardConfig;

/// What should receive focus
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// A task card
    Task(u64),
    /// A list card (its header)
    List(u64),
    /// The new-task input of a list
    TaskInput(u64),
    /// The board container itself
    Board,
}

/// Result of a focus attempt; not-found is a graceful outcome, the
/// caller simply leaves focus where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    Focused,
    NotFound,
}

/// Implemented by the rendering layer. `try_focus` resolves the target
/// element and focuses it, returning false when it does not exist yet.
pub trait FocusHost: Send + Sync {
    fn try_focus(&self, target: &FocusTarget) -> bool;
}

/// Retry-based focus acquisition over a rendering-layer host
pub struct FocusCoordinator {
    host: Arc<dyn FocusHost>,
    attempts: u32,
    interval: std::time::Duration,
}

impl FocusCoordinator {
    pub fn new(host: Arc<dyn FocusHost>, config: &BoardConfig) -> Self {
        Self {
            host,
            attempts: config.focus_attempts,
            interval: config.focus_interval,
        }
    }

    /// Try to focus `target`, retrying on a fixed interval until the
    /// attempt budget is spent.
    pub async fn focus_with_retry(&self, target: &FocusTarget) -> FocusOutcome {
        for attempt in 0..self.attempts {
            if self.host.try_focus(target) {
                return FocusOutcome::Focused;
            }
            if attempt + 1 < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        debug!("focus target {:?} not found after {} attempts", target, self.attempts);
        FocusOutcome::NotFound
    }
}
