//! Time-boxed session lifecycle.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Running,
    /// Terminal.
    Ended,
}

/// What a call to [`Session::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Not running, nothing changed.
    Idle,
    Running,
    /// This call crossed `max_time`.
    JustEnded,
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    total_time: f32,
    max_time: f32,
    last_reported: f32,
}

impl Session {
    pub fn new(max_time: f32) -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            total_time: 0.0,
            max_time,
            last_reported: 0.0,
        }
    }

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.phase != SessionPhase::NotStarted
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.phase == SessionPhase::Ended
    }

    #[inline]
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    #[inline]
    pub fn max_time(&self) -> f32 {
        self.max_time
    }

    /// Begin running from zero. Returns false once the session has ended.
    pub fn start(&mut self) -> bool {
        if self.is_ended() {
            return false;
        }
        self.phase = SessionPhase::Running;
        self.total_time = 0.0;
        self.last_reported = 0.0;
        true
    }

    /// Force the terminal state. Returns true if this call ended it.
    pub fn end(&mut self) -> bool {
        if self.is_ended() {
            return false;
        }
        self.phase = SessionPhase::Ended;
        true
    }

    /// Accumulate `dt` seconds while running.
    pub fn advance(&mut self, dt: f32) -> Advance {
        if !self.is_running() {
            return Advance::Idle;
        }
        self.total_time += dt.max(0.0);
        if self.total_time > self.max_time {
            self.phase = SessionPhase::Ended;
            Advance::JustEnded
        } else {
            Advance::Running
        }
    }

    /// True when at least a second has accrued since the last true return.
    pub fn should_send_time(&mut self) -> bool {
        if self.total_time - self.last_reported >= 1.0 {
            self.last_reported = self.total_time;
            true
        } else {
            false
        }
    }

    /// Elapsed share of the session, rounded half-up to two decimals.
    pub fn progress_fraction(&self) -> f32 {
        if self.max_time <= 0.0 {
            return 0.0;
        }
        let ratio = self.total_time / self.max_time;
        (ratio * 100.0 + 0.5).floor() / 100.0
    }
}
