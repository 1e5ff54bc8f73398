use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Why a cooperative computation was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Cancelled => write!(f, "cancelled"),
            Interrupt::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Polled by long-running loops at well-defined boundaries. Returning
/// `Some` means the caller must abandon its work.
pub trait CancelSignal: Send + Sync {
    fn interrupted(&self) -> Option<Interrupt>;

    #[inline]
    fn check(&self) -> Result<(), Interrupt> {
        match self.interrupted() {
            Some(interrupt) => Err(interrupt),
            None => Ok(()),
        }
    }
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl CancelSignal for Never {
    #[inline]
    fn interrupted(&self) -> Option<Interrupt> {
        None
    }
}

impl CancelSignal for AtomicBool {
    #[inline]
    fn interrupted(&self) -> Option<Interrupt> {
        if self.load(Ordering::Relaxed) {
            Some(Interrupt::Cancelled)
        } else {
            None
        }
    }
}

/// Shared cancellation flag with an optional deadline. Clones observe the
/// same flag, so cancelling any clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A token sharing this token's flag whose deadline is the earlier of
    /// the existing one and `now + timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.interrupted().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

impl CancelSignal for CancelToken {
    #[inline]
    fn interrupted(&self) -> Option<Interrupt> {
        if self.flag.load(Ordering::Relaxed) {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }
}

/// Runs `f` with a token that expires after `timeout`. The token is
/// cancelled once `f` returns so that clones handed to other work stop too.
pub fn run_with_deadline<T, F>(timeout: Duration, f: F) -> T
where
    F: FnOnce(&CancelToken) -> T,
{
    let token = CancelToken::with_timeout(timeout);
    let result = f(&token);
    token.cancel();
    result
}
