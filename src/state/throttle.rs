use std::time::Duration;

use tokio::time::Instant;

/// Cooldown applied to manual refreshes when none is configured.
pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

/// Whether a manual refresh may be requested right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshGate {
    /// Whether a manual refresh would be rejected.
    pub disabled: bool,
    /// Whole seconds until the gate reopens, rounded up. Zero when open.
    pub seconds_remaining: u64,
}

/// Remembers the last accepted manual refresh and gates the next one.
#[derive(Debug, Clone)]
pub struct RefreshThrottle {
    cooldown: Duration,
    last_accepted: Option<Instant>,
}

impl Default for RefreshThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_COOLDOWN)
    }
}

impl RefreshThrottle {
    /// Throttle that never accepted a refresh.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// When the last refresh was accepted.
    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    /// Accept a refresh at `now` when the cooldown elapsed, recording it.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        if self.gate(now).disabled {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }

    /// Gate state as observed at `now`.
    pub fn gate(&self, now: Instant) -> RefreshGate {
        gate_at(self.last_accepted, self.cooldown, now)
    }

    /// Forget the last accepted refresh.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

/// Pure gate computation shared by the throttle and published snapshots.
pub fn gate_at(last_accepted: Option<Instant>, cooldown: Duration, now: Instant) -> RefreshGate {
    let Some(last) = last_accepted else {
        return RefreshGate::default();
    };

    let elapsed = now.saturating_duration_since(last);
    if elapsed >= cooldown {
        return RefreshGate::default();
    }

    let remaining_ms = (cooldown - elapsed).as_millis();
    RefreshGate {
        disabled: true,
        seconds_remaining: remaining_ms.div_ceil(1_000) as u64,
    }
}
