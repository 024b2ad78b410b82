//! Fault injection for the simulated camera feeds.
//!
//! A feed asks its injector once per load or refresh whether this attempt
//! should end in a connection error. Production wiring uses [`RandomFaults`];
//! tests swap in a deterministic injector.

use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;

/// Decision point for a simulated feed failure
pub trait FaultInjector: Send + Sync {
    fn should_fail(&self) -> bool;
}

pub type SharedFaultInjector = Arc<dyn FaultInjector>;

/// Fails with a fixed probability using the thread-local RNG
#[derive(Debug, Clone, Copy)]
pub struct RandomFaults {
    probability: f64,
}

impl RandomFaults {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomFaults {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl FaultInjector for RandomFaults {
    fn should_fail(&self) -> bool {
        // random() > 1 - p, so p = 0.2 matches a draw above 0.8
        rand::rng().random::<f64>() > 1.0 - self.probability
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FaultInjector for NeverFail {
    fn should_fail(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl FaultInjector for AlwaysFail {
    fn should_fail(&self) -> bool {
        true
    }
}

/// Replays a fixed sequence of outcomes, then succeeds forever
#[derive(Debug, Default)]
pub struct ScriptedFaults {
    outcomes: Mutex<VecDeque<bool>>,
}

impl ScriptedFaults {
    pub fn new<I: IntoIterator<Item = bool>>(outcomes: I) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    pub fn push(&self, fail: bool) {
        self.outcomes.lock().push_back(fail);
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.lock().len()
    }
}

impl FaultInjector for ScriptedFaults {
    fn should_fail(&self) -> bool {
        self.outcomes.lock().pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_faults_extremes() {
        let never = RandomFaults::new(0.0);
        let always = RandomFaults::new(1.0);

        for _ in 0..100 {
            assert!(!never.should_fail());
        }
        // A draw of exactly 0.0 is the only way p = 1 can miss.
        let failures = (0..100).filter(|_| always.should_fail()).count();
        assert!(failures >= 99);
    }

    #[test]
    fn test_random_faults_clamps_probability() {
        assert_eq!(RandomFaults::new(4.0).probability(), 1.0);
        assert_eq!(RandomFaults::new(-1.0).probability(), 0.0);
    }

    #[test]
    fn test_scripted_faults_replay_then_succeed() {
        let faults = ScriptedFaults::new([true, false, true]);

        assert!(faults.should_fail());
        assert!(!faults.should_fail());
        assert!(faults.should_fail());
        assert_eq!(faults.remaining(), 0);
        assert!(!faults.should_fail());
    }
}
