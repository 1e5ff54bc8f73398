use dispatch_utils::{CancelSignal, Interrupt};
use thiserror::Error;

/// The planner rejects no input; the only way a call fails is by being
/// interrupted, in which case no partial plan is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("planning was cancelled")]
    Cancelled,
    #[error("planning deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupt> for PlanError {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Cancelled => PlanError::Cancelled,
            Interrupt::DeadlineExceeded => PlanError::DeadlineExceeded,
        }
    }
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

#[inline]
pub(crate) fn poll(signal: &dyn CancelSignal) -> PlanResult<()> {
    Ok(signal.check()?)
}

/// Counts inner-loop steps and polls the signal once every `interval` of them.
pub(crate) struct Poller<'a> {
    signal: &'a dyn CancelSignal,
    interval: usize,
    steps: usize,
}

impl<'a> Poller<'a> {
    pub(crate) fn new(signal: &'a dyn CancelSignal, interval: usize) -> Self {
        Self {
            signal,
            interval: interval.max(1),
            steps: 0,
        }
    }

    /// Unconditional poll, used at item boundaries.
    #[inline]
    pub(crate) fn check(&self) -> PlanResult<()> {
        poll(self.signal)
    }

    #[inline]
    pub(crate) fn step(&mut self) -> PlanResult<()> {
        self.steps += 1;
        if self.steps % self.interval == 0 {
            poll(self.signal)?;
        }
        Ok(())
    }
}
