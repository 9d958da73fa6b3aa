// Hold detection for the pinch viewfinder.
// Visual: while the rectangle between your fingers stays still, its outline fades
// from red to green and a progress bar fills above it; any wobble resets it.

use crate::geometry::{Point, Rect};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverPhase {
    Idle,
    Hovering { since: Instant },
}

/// Per-hold state. `has_snapped_this_hold` is only ever true while `phase` is Hovering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverState {
    pub phase: HoverPhase,
    pub has_snapped_this_hold: bool,
    /// Centre of the previous frame's rectangle; None after a frame with no hand.
    pub last_center: Option<Point>,
}

impl Default for HoverState {
    fn default() -> Self {
        Self { phase: HoverPhase::Idle, has_snapped_this_hold: false, last_center: None }
    }
}

impl HoverState {
    pub fn is_hovering(&self) -> bool {
        matches!(self.phase, HoverPhase::Hovering { .. })
    }
}

/// What the timer reports for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverReading {
    pub hovering: bool,
    pub elapsed: Duration,
    /// elapsed / total_time, clamped to [0, 1]
    pub progress: f32,
}

impl HoverReading {
    const IDLE: HoverReading = HoverReading { hovering: false, elapsed: Duration::ZERO, progress: 0.0 };
}

#[derive(Clone, Debug)]
pub struct HoverTimer {
    state: HoverState,
    total_time: Duration,
    stability_threshold: f32,
    min_capture_size: f32,
}

impl HoverTimer {
    pub fn new(total_time: Duration, stability_threshold: f32, min_capture_size: f32) -> Self {
        Self { state: HoverState::default(), total_time, stability_threshold, min_capture_size }
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Advance one frame. `rect` is None when no hand was detected.
    pub fn update(&mut self, rect: Option<Rect>, drag_active: bool, now: Instant) -> HoverReading {
        let Some(rect) = rect else {
            self.state = HoverState::default();
            return HoverReading::IDLE;
        };

        let center = rect.center();
        let movement = self
            .state
            .last_center
            .map_or(f32::INFINITY, |last| center.distance(last));

        let stable = !drag_active
            && movement < self.stability_threshold
            && rect.w > self.min_capture_size
            && rect.h > self.min_capture_size;

        if stable {
            if let HoverPhase::Idle = self.state.phase {
                self.state.phase = HoverPhase::Hovering { since: now };
            }
        } else {
            self.state.phase = HoverPhase::Idle;
            self.state.has_snapped_this_hold = false;
        }

        // Judged against the previous frame, not the start of the hold.
        self.state.last_center = Some(center);

        self.reading(now)
    }

    /// Elapsed hold time and progress as of `now`.
    pub fn reading(&self, now: Instant) -> HoverReading {
        match self.state.phase {
            HoverPhase::Idle => HoverReading::IDLE,
            HoverPhase::Hovering { since } => {
                let elapsed = now.saturating_duration_since(since);
                let progress = if self.total_time.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f32() / self.total_time.as_secs_f32()).clamp(0.0, 1.0)
                };
                HoverReading { hovering: true, elapsed, progress }
            }
        }
    }

    /// Record that this hold already produced a tile. Ignored while idle.
    pub fn mark_snapped(&mut self) {
        if self.state.is_hovering() {
            self.state.has_snapped_this_hold = true;
        }
    }

    pub fn has_snapped(&self) -> bool {
        self.state.has_snapped_this_hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> HoverTimer {
        HoverTimer::new(Duration::from_millis(500), 8.0, 20.0)
    }

    fn ms(t0: Instant, n: u64) -> Instant {
        t0 + Duration::from_millis(n)
    }

    const R: Rect = Rect::new(100.0, 100.0, 50.0, 50.0);

    #[test]
    fn first_sighting_is_not_stable() {
        let mut t = timer();
        let t0 = Instant::now();
        assert!(!t.update(Some(R), false, t0).hovering);
        assert!(t.update(Some(R), false, ms(t0, 16)).hovering);
    }

    #[test]
    fn timer_keeps_start_while_stable() {
        let mut t = timer();
        let t0 = Instant::now();
        t.update(Some(R), false, t0);
        t.update(Some(R), false, ms(t0, 100));
        let nudged = Rect::new(103.0, 102.0, 50.0, 50.0);
        let reading = t.update(Some(nudged), false, ms(t0, 350));
        assert!(reading.hovering);
        assert_eq!(reading.elapsed, Duration::from_millis(250));
        assert!((reading.progress - 0.5).abs() < 1e-6);

        let reading = t.update(Some(nudged), false, ms(t0, 2000));
        assert_eq!(reading.progress, 1.0);
    }

    #[test]
    fn big_jump_cancels_hold_and_clears_snap() {
        let mut t = timer();
        let t0 = Instant::now();
        t.update(Some(R), false, t0);
        t.update(Some(R), false, ms(t0, 16));
        t.mark_snapped();
        assert!(t.has_snapped());

        // Centre moves exactly 8px: not below the threshold.
        let jumped = Rect::new(108.0, 100.0, 50.0, 50.0);
        let reading = t.update(Some(jumped), false, ms(t0, 32));
        assert!(!reading.hovering);
        assert_eq!(reading.progress, 0.0);
        assert!(!t.has_snapped());
        assert_eq!(t.state().last_center, Some(jumped.center()));
    }

    #[test]
    fn stability_is_judged_against_previous_frame() {
        let mut t = timer();
        let t0 = Instant::now();
        // Slow drift of 5px per frame never breaks the hold even though it adds up.
        for i in 0..10u64 {
            let r = Rect::new(100.0 + 5.0 * i as f32, 100.0, 50.0, 50.0);
            let reading = t.update(Some(r), false, ms(t0, 16 * i));
            assert_eq!(reading.hovering, i > 0);
        }
    }

    #[test]
    fn undersized_rect_never_hovers() {
        let mut t = timer();
        let t0 = Instant::now();
        let small = Rect::new(100.0, 100.0, 20.0, 50.0);
        for i in 0..5 {
            assert!(!t.update(Some(small), false, ms(t0, 16 * i)).hovering);
        }
    }

    #[test]
    fn dragging_blocks_hover() {
        let mut t = timer();
        let t0 = Instant::now();
        t.update(Some(R), false, t0);
        assert!(t.update(Some(R), false, ms(t0, 16)).hovering);
        assert!(!t.update(Some(R), true, ms(t0, 32)).hovering);
        assert!(!t.update(Some(R), true, ms(t0, 48)).hovering);
        // Released: a fresh hold starts, with a fresh start time.
        let reading = t.update(Some(R), false, ms(t0, 64));
        assert!(reading.hovering);
        assert_eq!(reading.elapsed, Duration::ZERO);
    }

    #[test]
    fn losing_the_hand_resets_everything() {
        let mut t = timer();
        let t0 = Instant::now();
        t.update(Some(R), false, t0);
        t.update(Some(R), false, ms(t0, 16));
        t.mark_snapped();
        let reading = t.update(None, false, ms(t0, 32));
        assert!(!reading.hovering);
        assert_eq!(*t.state(), HoverState::default());
    }

    #[test]
    fn mark_snapped_is_ignored_while_idle() {
        let mut t = timer();
        t.mark_snapped();
        assert!(!t.has_snapped());
    }
}
