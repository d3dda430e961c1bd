//! Decision engine.
//!
//! Turns a [`SignalBundle`] into a [`Decision`] with exactly one strategy,
//! chosen once at startup from whether a reasoning backend is configured.

mod heuristic;
mod remote;

use std::sync::Arc;

use tracing::info;

pub use heuristic::{HeuristicDecider, BLURRY_SCORE, CLUTTERED_SCORE, SUITABLE_SCORE};
pub use remote::{build_request, parse_verdict, system_prompt, RemoteDecider, USER_PROMPT_PREFIX};

use crate::domain::{Decision, DecisionPath, SignalBundle};
use crate::ports::ReasoningBackend;

/// The active decision strategy.
#[derive(Debug, Clone)]
pub enum DecisionEngine {
    /// Local rules; used when no backend is configured.
    Heuristic(HeuristicDecider),
    /// External reasoning service.
    Remote(RemoteDecider),
}

impl DecisionEngine {
    /// Selects the strategy: remote when a backend is given, heuristic otherwise.
    #[must_use]
    pub fn select(backend: Option<Arc<dyn ReasoningBackend>>) -> Self {
        match backend {
            Some(backend) => {
                info!("Decisions delegated to reasoning backend {}", backend.name());
                Self::Remote(RemoteDecider::new(backend))
            }
            None => {
                info!("No reasoning backend configured, using heuristic decisions");
                Self::Heuristic(HeuristicDecider::new())
            }
        }
    }

    /// Which path this engine takes.
    #[must_use]
    pub const fn path(&self) -> DecisionPath {
        match self {
            Self::Heuristic(_) => DecisionPath::Heuristic,
            Self::Remote(_) => DecisionPath::Remote,
        }
    }

    /// Judges a signal bundle.
    #[must_use]
    pub fn decide(&self, bundle: &SignalBundle) -> Decision {
        match self {
            Self::Heuristic(decider) => Decision::Verdict(decider.decide(bundle)),
            Self::Remote(decider) => decider.decide(bundle),
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::Heuristic(HeuristicDecider::new())
    }
}
