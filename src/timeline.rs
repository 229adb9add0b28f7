//! Deterministic animation primitives: easing curves, scalar tweens,
//! staggered tween groups and a repeating interval timer.
//!
//! Everything is driven by an explicit clock (`Duration` since mount), so the
//! same sequence of `advance` calls always produces the same values.

use std::time::Duration;

use serde::Deserialize;

/// Easing curves used by the slider animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed.
    #[serde(alias = "none")]
    Linear,
    /// Quadratic ease out.
    #[default]
    Power1Out,
    /// Cubic ease out.
    Power2Out,
    /// Quartic ease out.
    Power3Out,
}

impl Easing {
    /// Apply the curve to a normalized time value.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let inv = 1.0 - t;
        match self {
            Self::Linear => t,
            Self::Power1Out => 1.0 - inv * inv,
            Self::Power2Out => 1.0 - inv * inv * inv,
            Self::Power3Out => 1.0 - inv * inv * inv * inv,
        }
    }
}

/// How an animation ended. Each tween resolves at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl TweenSpec {
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            delay: Duration::ZERO,
            easing,
        }
    }

    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A scalar animated from `from` to `to`.
///
/// `advance` returns `Some(Resolution::Completed)` exactly once, on the tick
/// where the tween reaches its end; `cancel` returns
/// `Some(Resolution::Cancelled)` only if the tween was still running. A
/// cancelled tween never completes and a completed tween cannot be cancelled.
#[derive(Debug, Clone)]
pub struct Tween {
    spec: TweenSpec,
    started_at: Duration,
    value: f32,
    resolution: Option<Resolution>,
}

impl Tween {
    #[must_use]
    pub fn start(spec: TweenSpec, now: Duration) -> Self {
        Self {
            spec,
            started_at: now,
            value: spec.from,
            resolution: None,
        }
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.resolution.is_none()
    }

    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn advance(&mut self, now: Duration) -> Option<Resolution> {
        if self.resolution.is_some() {
            return None;
        }
        let elapsed = now
            .saturating_sub(self.started_at)
            .saturating_sub(self.spec.delay);
        let done = elapsed >= self.spec.duration;
        let t = if done {
            1.0
        } else {
            elapsed.as_secs_f32() / self.spec.duration.as_secs_f32()
        };
        self.value = self.spec.from + (self.spec.to - self.spec.from) * self.spec.easing.apply(t);
        if done {
            self.resolution = Some(Resolution::Completed);
            return self.resolution;
        }
        None
    }

    pub fn cancel(&mut self) -> Option<Resolution> {
        if self.resolution.is_some() {
            return None;
        }
        self.resolution = Some(Resolution::Cancelled);
        self.resolution
    }
}

/// Per-element start offsets inside a tween group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stagger {
    /// Fixed delay between consecutive elements.
    Each(Duration),
    /// Total spread shared by all elements, scaled by distance from the
    /// middle element.
    FromCenter(Duration),
}

impl Stagger {
    #[must_use]
    pub fn offsets(&self, count: usize) -> Vec<Duration> {
        match *self {
            Self::Each(step) => (0..count)
                .map(|i| step * u32::try_from(i).unwrap_or(u32::MAX))
                .collect(),
            Self::FromCenter(total) => {
                if count <= 1 {
                    return vec![Duration::ZERO; count];
                }
                let half = (count - 1) as f32 / 2.0;
                (0..count)
                    .map(|i| total.mul_f32((i as f32 - half).abs() / half))
                    .collect()
            }
        }
    }
}

/// Tweens sharing one spec, offset by a stagger. Resolves once, when every
/// member completed or when the group is cancelled.
#[derive(Debug, Clone)]
pub struct TweenGroup {
    tweens: Vec<Tween>,
    resolution: Option<Resolution>,
}

impl TweenGroup {
    #[must_use]
    pub fn start(spec: TweenSpec, count: usize, stagger: Stagger, now: Duration) -> Self {
        let tweens = stagger
            .offsets(count)
            .into_iter()
            .map(|offset| Tween::start(spec.delayed(spec.delay + offset), now))
            .collect();
        Self {
            tweens,
            resolution: None,
        }
    }

    #[must_use]
    pub fn values(&self) -> Vec<f32> {
        self.tweens.iter().map(Tween::value).collect()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.resolution.is_none()
    }

    pub fn advance(&mut self, now: Duration) -> Option<Resolution> {
        if self.resolution.is_some() {
            return None;
        }
        for tween in &mut self.tweens {
            tween.advance(now);
        }
        if self
            .tweens
            .iter()
            .all(|t| t.resolution() == Some(Resolution::Completed))
        {
            self.resolution = Some(Resolution::Completed);
            return self.resolution;
        }
        None
    }

    pub fn cancel(&mut self) -> Option<Resolution> {
        if self.resolution.is_some() {
            return None;
        }
        for tween in &mut self.tweens {
            tween.cancel();
        }
        self.resolution = Some(Resolution::Cancelled);
        self.resolution
    }
}

/// Repeating timer. Fires once per elapsed period; when ticks arrive late it
/// fires once and skips the missed periods.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_fire: Option<Duration>,
}

impl IntervalTimer {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_fire: None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.next_fire.is_some()
    }

    /// Arm (or re-arm) the timer so the next fire is one period after `now`.
    /// Saturates instead of overflowing for huge periods.
    pub fn restart(&mut self, now: Duration) {
        self.next_fire = Some(now.saturating_add(self.period));
    }

    pub fn cancel(&mut self) {
        self.next_fire = None;
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        let Some(due) = self.next_fire else {
            return false;
        };
        if now < due || self.period.is_zero() {
            return now >= due;
        }
        let missed = (now - due).as_nanos() / self.period.as_nanos();
        let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        let advance = self.period.checked_mul(steps).unwrap_or(Duration::MAX);
        self.next_fire = Some(due.saturating_add(advance));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn easing_endpoints() {
        for easing in [Easing::Linear, Easing::Power1Out, Easing::Power2Out, Easing::Power3Out] {
            assert!(easing.apply(0.0).abs() < f32::EPSILON);
            assert!((easing.apply(1.0) - 1.0).abs() < f32::EPSILON);
        }
        assert!(Easing::Power1Out.apply(0.5) > Easing::Linear.apply(0.5));
    }

    #[test]
    fn tween_completes_exactly_once() {
        let mut tween = Tween::start(TweenSpec::new(0.0, 1.0, secs(5.0), Easing::Power1Out), Duration::ZERO);
        assert_eq!(tween.advance(secs(2.5)), None);
        assert!((tween.value() - 0.75).abs() < 1e-4);
        assert_eq!(tween.advance(secs(5.0)), Some(Resolution::Completed));
        assert_eq!(tween.advance(secs(6.0)), None);
        assert_eq!(tween.cancel(), None);
        assert!((tween.value() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cancelled_tween_never_completes() {
        let mut tween = Tween::start(TweenSpec::new(0.0, 1.0, secs(1.0), Easing::Linear), Duration::ZERO);
        tween.advance(secs(0.5));
        assert_eq!(tween.cancel(), Some(Resolution::Cancelled));
        assert_eq!(tween.cancel(), None);
        assert_eq!(tween.advance(secs(2.0)), None);
        assert!((tween.value() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn delay_holds_start_value() {
        let spec = TweenSpec::new(1.0, 0.0, secs(1.0), Easing::Linear).delayed(secs(0.2));
        let mut tween = Tween::start(spec, secs(10.0));
        tween.advance(secs(10.1));
        assert!((tween.value() - 1.0).abs() < f32::EPSILON);
        tween.advance(secs(10.7));
        assert!((tween.value() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn center_stagger_is_symmetric() {
        let offsets = Stagger::FromCenter(secs(0.1)).offsets(5);
        assert_eq!(offsets[2], Duration::ZERO);
        assert_eq!(offsets[0], offsets[4]);
        assert_eq!(offsets[1], offsets[3]);
        assert!((offsets[0].as_secs_f32() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn each_stagger_steps_linearly() {
        let offsets = Stagger::Each(Duration::from_millis(50)).offsets(3);
        assert_eq!(
            offsets,
            vec![Duration::ZERO, Duration::from_millis(50), Duration::from_millis(100)]
        );
    }

    #[test]
    fn group_resolves_after_last_member() {
        let spec = TweenSpec::new(-100.0, 0.0, secs(1.0), Easing::Linear);
        let mut group = TweenGroup::start(spec, 3, Stagger::Each(secs(0.5)), Duration::ZERO);
        assert_eq!(group.advance(secs(1.5)), None);
        assert_eq!(group.advance(secs(2.0)), Some(Resolution::Completed));
        assert!(group.values().iter().all(|v| v.abs() < f32::EPSILON));
    }

    #[test]
    fn interval_fires_once_per_period() {
        let mut timer = IntervalTimer::new(secs(5.0));
        assert!(!timer.poll(secs(100.0)));
        timer.restart(Duration::ZERO);
        assert!(!timer.poll(secs(4.9)));
        assert!(timer.poll(secs(5.0)));
        assert!(!timer.poll(secs(5.1)));
        assert!(timer.poll(secs(17.0)));
        assert!(!timer.poll(secs(19.0)));
        assert!(timer.poll(secs(20.0)));
        timer.cancel();
        assert!(!timer.poll(secs(40.0)));
    }

    #[test]
    fn late_poll_skips_missed_periods_in_one_step() {
        let mut timer = IntervalTimer::new(Duration::from_secs(5));
        timer.restart(Duration::ZERO);
        assert!(timer.poll(Duration::from_secs(1_000_002)));
        assert!(!timer.poll(Duration::from_secs(1_000_004)));
        assert!(timer.poll(Duration::from_secs(1_000_005)));
    }

    #[test]
    fn huge_period_saturates_instead_of_panicking() {
        let mut timer = IntervalTimer::new(Duration::MAX);
        timer.restart(Duration::from_secs(10));
        assert!(timer.is_armed());
        assert!(!timer.poll(Duration::from_secs(1_000_000)));

        let mut timer = IntervalTimer::new(Duration::from_secs(u64::MAX / 2));
        timer.restart(Duration::ZERO);
        assert!(timer.poll(Duration::from_secs(u64::MAX / 2 + 1)));
        assert!(!timer.poll(Duration::from_secs(u64::MAX - 2)));
    }
}
