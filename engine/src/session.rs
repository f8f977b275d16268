use std::time::Duration;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::roll::{RollResolver, RollResult};
use crate::Roller;

/// Identifies one roll request so a superseded completion can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RollTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollPhase {
    Idle,
    Rolling { ticket: RollTicket, ready_at: Duration },
    Resolved,
}

/// Flavor text on screen and when it goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveFlavor {
    pub text: &'static str,
    pub critical_fail: bool,
    pub clear_at: Duration,
}

/// The dice tray: `Idle → Rolling → Resolved → Rolling → …`.
///
/// Time is whatever monotonic clock the caller drives it with; the session
/// never sleeps. A roll waits `roll_delay` before drawing, and its flavor
/// text clears `flavor_display` after it resolves. Starting a new roll
/// cancels both the pending draw and the pending clear.
#[derive(Debug, Clone)]
pub struct RollSession {
    resolver: RollResolver,
    phase: RollPhase,
    issued: u64,
    result: Option<RollResult>,
    flavor: Option<ActiveFlavor>,
    roll_delay: Duration,
    flavor_display: Duration,
}

impl RollSession {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_timings(config.roll_delay(), config.flavor_display())
    }

    pub fn with_timings(roll_delay: Duration, flavor_display: Duration) -> Self {
        Self {
            resolver: RollResolver::new(),
            phase: RollPhase::Idle,
            issued: 0,
            result: None,
            flavor: None,
            roll_delay,
            flavor_display,
        }
    }

    pub fn phase(&self) -> RollPhase {
        self.phase
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.phase, RollPhase::Rolling { .. })
    }

    pub fn result(&self) -> Option<&RollResult> {
        self.result.as_ref()
    }

    pub fn flavor(&self) -> Option<&ActiveFlavor> {
        self.flavor.as_ref()
    }

    pub fn begin(&mut self, now: Duration) -> RollTicket {
        if let RollPhase::Rolling { ticket, .. } = self.phase {
            debug!(?ticket, "superseding in-flight roll");
        }
        self.issued += 1;
        let ticket = RollTicket(self.issued);
        self.phase = RollPhase::Rolling {
            ticket,
            ready_at: now + self.roll_delay,
        };
        self.result = None;
        self.flavor = None;
        ticket
    }

    /// Draw and resolve for `ticket`. A ticket that is no longer the
    /// in-flight one yields `Ok(None)` and leaves the session alone.
    pub fn complete(
        &mut self,
        ticket: RollTicket,
        now: Duration,
        dice: &[u32],
        modifier_total: i64,
        roller: &mut impl Roller,
    ) -> Result<Option<&RollResult>> {
        match self.phase {
            RollPhase::Rolling { ticket: current, .. } if current == ticket => {}
            _ => {
                debug!(?ticket, "discarding superseded roll");
                return Ok(None);
            }
        }
        let result = match self.resolver.roll(dice, modifier_total, roller) {
            Ok(r) => r,
            Err(err) => {
                self.phase = RollPhase::Idle;
                return Err(err);
            }
        };
        self.flavor = Some(ActiveFlavor {
            text: result.flavor,
            critical_fail: result.is_critical_fail(),
            clear_at: now + self.flavor_display,
        });
        self.phase = RollPhase::Resolved;
        self.result = Some(result);
        Ok(self.result.as_ref())
    }

    /// Advance to `now`: expire flavor text, then resolve a roll that is due.
    pub fn tick(
        &mut self,
        now: Duration,
        dice: &[u32],
        modifier_total: i64,
        roller: &mut impl Roller,
    ) -> Result<Option<&RollResult>> {
        self.expire_flavor(now);
        if let RollPhase::Rolling { ticket, ready_at } = self.phase {
            if now >= ready_at {
                return self.complete(ticket, now, dice, modifier_total, roller);
            }
        }
        Ok(None)
    }

    /// Returns true if flavor text was cleared by this call.
    pub fn expire_flavor(&mut self, now: Duration) -> bool {
        match self.flavor {
            Some(f) if now >= f.clear_at => {
                self.flavor = None;
                true
            }
            _ => false,
        }
    }
}
