//! Gain envelopes as timed breakpoints.
//!
//! Breakpoints follow the usual automation semantics: `Set` jumps to a value
//! at its time, `Linear` and `Exponential` ramp from the previous breakpoint's
//! value so that the target is reached exactly at the breakpoint's time.
//! After the last breakpoint the value holds.

/// How a breakpoint is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub time: f64,
    pub value: f64,
    pub curve: Curve,
}

/// Breakpoints in non-decreasing time order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    points: Vec<Breakpoint>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, time: f64, value: f64) -> Self {
        self.push(time, value, Curve::Set);
        self
    }

    pub fn linear_to(mut self, time: f64, value: f64) -> Self {
        self.push(time, value, Curve::Linear);
        self
    }

    pub fn exponential_to(mut self, time: f64, value: f64) -> Self {
        self.push(time, value, Curve::Exponential);
        self
    }

    fn push(&mut self, time: f64, value: f64, curve: Curve) {
        // keep time order; a breakpoint earlier than the last one is pinned to it
        let time = self.points.last().map_or(time, |p| time.max(p.time));
        self.points.push(Breakpoint { time, value, curve });
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// Peak value across all breakpoints.
    #[cfg(test)]
    pub(crate) fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }

    /// Gain at absolute time `t`. Zero before the first breakpoint.
    pub fn gain_at(&self, t: f64) -> f64 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        if t < first.time {
            return 0.0;
        }

        let mut prev = *first;
        for p in &self.points[1..] {
            if t < p.time {
                return interpolate(&prev, p, t);
            }
            prev = *p;
        }
        prev.value
    }
}

fn interpolate(from: &Breakpoint, to: &Breakpoint, t: f64) -> f64 {
    let span = to.time - from.time;
    if span <= 0.0 {
        return to.value;
    }
    let frac = (t - from.time) / span;
    match to.curve {
        Curve::Set => from.value,
        Curve::Linear => from.value + (to.value - from.value) * frac,
        Curve::Exponential => {
            // undefined through zero; hold until the ramp ends
            if from.value == 0.0 || to.value == 0.0 || from.value.signum() != to.value.signum() {
                from.value
            } else {
                from.value * (to.value / from.value).powf(frac)
            }
        }
    }
}
