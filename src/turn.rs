use tracing::debug;
use web_time::{Duration, Instant};

use crate::types::{Outcome, Player, WinReason};

const TICK: Duration = Duration::from_secs(1);

/// Per-turn countdown, counted in whole-second ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn restart(&mut self) {
        self.remaining = self.duration;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances one tick. Returns `true` exactly once, on the tick that
    /// exhausts the countdown; the countdown is stopped afterwards.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return true;
        }
        false
    }
}

/// Whose turn it is, whether this session may act on it, and the turn
/// countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnController {
    current: Player,
    /// The seat this session controls in networked play. `None` offline and
    /// against the computer, where the session may always act.
    local_player: Option<Player>,
    countdown: Countdown,
}

impl TurnController {
    /// Red moves first. The countdown starts immediately.
    pub fn new(turn_seconds: u32, local_player: Option<Player>) -> Self {
        let mut countdown = Countdown::new(turn_seconds);
        countdown.restart();
        Self {
            current: Player::Red,
            local_player,
            countdown,
        }
    }

    pub fn current(&self) -> Player {
        self.current
    }

    pub fn local_player(&self) -> Option<Player> {
        self.local_player
    }

    pub fn local_may_act(&self) -> bool {
        self.local_player.is_none_or(|p| p == self.current)
    }

    pub fn time_left(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Hands the turn to the other player and restarts the countdown.
    pub fn advance(&mut self) -> Player {
        self.current = self.current.other();
        self.countdown.restart();
        debug!(
            player = self.current.name(),
            local_may_act = self.local_may_act(),
            "turn changed"
        );
        self.current
    }

    /// Advances the countdown one tick. Running out ends the game for the
    /// player whose turn it was.
    pub fn tick(&mut self) -> Option<Outcome> {
        if self.countdown.tick() {
            return Some(Outcome::Winner {
                player: self.current.other(),
                reason: WinReason::Timeout,
            });
        }
        None
    }

    pub fn halt(&mut self) {
        self.countdown.stop();
    }
}

/// Converts wall-clock time into countdown ticks for hosts that poll rather
/// than run a one-second interval.
#[derive(Debug, Clone, Copy)]
pub struct TurnClock {
    last: Instant,
}

impl TurnClock {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Whole seconds elapsed since the last counted tick. The fractional
    /// remainder carries over to the next call.
    pub fn elapsed_ticks(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let ticks = (elapsed.as_millis() / TICK.as_millis()) as u32;
        self.last += TICK * ticks;
        ticks
    }
}
