//! Synthesis configuration and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Interrupt;

/// A shareable cancellation flag.
///
/// Clones share the same flag. A run observes cancellation between explored
/// game states, between fixpoint iterations and between strategy nodes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Configuration for [`synthesize`][crate::synth::synthesize].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use gr1_rs::config::SynthesisConfig;
///
/// let config = SynthesisConfig::default()
///     .with_parallel(false)
///     .with_deadline(Duration::from_secs(5));
/// assert_eq!(config.deadline, Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Evaluate the per-goal least fixpoints on worker threads (default: true)
    pub parallel: bool,
    /// Upper bound on the candidate product size |plant| × |valuations| (default: 2^22)
    pub max_game_states: u64,
    /// Wall-clock budget for a whole run, starting when the run does (default: none)
    pub deadline: Option<Duration>,
    /// External cancellation (default: none)
    pub cancel: Option<CancelToken>,
    /// Merge bisimilar machine states after extraction (default: false)
    pub minimize: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_game_states: 1 << 22,
            deadline: None,
            cancel: None,
            minimize: false,
        }
    }
}

impl SynthesisConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_game_states(mut self, max_game_states: u64) -> Self {
        self.max_game_states = max_game_states;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    /// Starts the clock for one run.
    pub fn watchdog(&self) -> Watchdog {
        Watchdog {
            cancel: self.cancel.clone(),
            deadline: self.deadline.map(|d| Instant::now() + d),
        }
    }
}

/// Checks cancellation and the deadline of one synthesis run.
///
/// The default watchdog never fires.
#[derive(Debug, Clone, Default)]
pub struct Watchdog {
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl Watchdog {
    pub fn check(&self) -> Result<(), Interrupt> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(Interrupt::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupt::DeadlineExceeded);
        }
        Ok(())
    }
}
