use std::time::Duration;

/// Real-time length of one countdown tick.
pub const TICK: Duration = Duration::from_secs(1);

/// Per-question countdown, decremented once per [`TICK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionTimer {
    remaining: u32,
    limit: u32,
}

impl QuestionTimer {
    pub fn new(limit_secs: u32) -> Self {
        Self {
            remaining: limit_secs,
            limit: limit_secs,
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_up(&self) -> bool {
        self.remaining == 0
    }

    /// Consumes one tick. Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.is_up() {
            return false;
        }
        self.remaining -= 1;
        self.is_up()
    }

    /// Urgency bucket used by views to colour the countdown.
    pub fn urgency(&self) -> Urgency {
        if self.remaining <= 3 {
            Urgency::Critical
        } else if self.remaining as f32 <= self.limit as f32 * 0.6 {
            Urgency::Warning
        } else {
            Urgency::Calm
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Calm,
    Warning,
    Critical,
}
