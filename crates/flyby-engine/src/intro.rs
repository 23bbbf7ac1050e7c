//! Scripted intro descent that hands over control when it lands.

/// Bounce-out easing on `t` in `[0, 1]`.
#[must_use]
pub fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    let t = t.clamp(0.0, 1.0);
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984_375
    }
}

/// One step of the intro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AscentStep {
    /// Still animating; place the vehicle at this altitude
    Descending(f32),
    /// Finished this step; place the vehicle here and enable controls
    Landed(f32),
    /// Already finished earlier
    Done,
}

/// Eases the vehicle from its spawn altitude down to a cruising altitude.
#[derive(Debug, Clone)]
pub struct ScriptedAscent {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    finished: bool,
}

impl ScriptedAscent {
    /// Animates from `from` to `to` over `duration` seconds.
    #[must_use]
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Whether the intro has completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Altitude at the current time.
    #[must_use]
    pub fn altitude(&self) -> f32 {
        let t = self.elapsed / self.duration;
        self.from + (self.to - self.from) * bounce_out(t)
    }

    /// Advances by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> AscentStep {
        if self.finished {
            return AscentStep::Done;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.elapsed >= self.duration {
            self.finished = true;
            AscentStep::Landed(self.to)
        } else {
            AscentStep::Descending(self.altitude())
        }
    }
}
