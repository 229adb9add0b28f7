//! Transition state and the slide change controller.
//!
//! The controller is the single owner of [`TransitionState`]. Every other
//! subsystem (compositor, pagination, text) reads it through
//! [`SlideController::state`] and [`SlideController::uniforms`].

use std::time::Duration;

use tracing::debug;

use crate::timeline::{Easing, Resolution, Tween, TweenSpec};

/// Pixel dimensions of each slide texture, indexed like the catalog.
/// `None` marks a texture that failed to load.
#[derive(Debug, Clone, Default)]
pub struct TextureAtlas {
    sizes: Vec<Option<[u32; 2]>>,
}

impl TextureAtlas {
    #[must_use]
    pub fn new(sizes: Vec<Option<[u32; 2]>>) -> Self {
        Self { sizes }
    }

    /// Atlas where every texture is `size`; useful when textures are not
    /// loaded up front.
    #[must_use]
    pub fn uniform(count: usize, size: [u32; 2]) -> Self {
        Self {
            sizes: vec![Some(size); count],
        }
    }

    /// Size uniform for `index`; `[1, 1]` when the texture is missing.
    #[must_use]
    pub fn size_of(&self, index: usize) -> [f32; 2] {
        match self.sizes.get(index).copied().flatten() {
            Some([w, h]) => [w as f32, h as f32],
            None => [1.0, 1.0],
        }
    }
}

/// Values consumed by the crossfade program. `resolution` is stamped by the
/// compositor when it presents; the controller leaves it at `[1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    pub texture_a: usize,
    pub texture_b: usize,
    pub progress: f32,
    pub resolution: [f32; 2],
    pub texture_a_size: [f32; 2],
    pub texture_b_size: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionState {
    pub current: usize,
    pub previous: Option<usize>,
    pub target: Option<usize>,
    pub transitioning: bool,
    pub blend_progress: f32,
}

impl TransitionState {
    fn mounted() -> Self {
        Self {
            current: 0,
            previous: None,
            target: None,
            transitioning: false,
            blend_progress: 0.0,
        }
    }
}

/// Outcome of [`SlideController::request_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum TransitionRequest {
    Started { from: usize, to: usize },
    /// A blend is already in flight; nothing changed.
    Busy,
    /// Explicit target outside the catalog; nothing changed.
    OutOfRange { target: usize, len: usize },
    /// Explicit target is already the current slide; nothing changed.
    AlreadyActive,
    /// The slider was torn down.
    Detached,
}

impl TransitionRequest {
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Emitted by [`SlideController::tick`] when a blend completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCommitted {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendSettings {
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for BlendSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            easing: Easing::Power1Out,
        }
    }
}

pub struct SlideController {
    len: usize,
    atlas: TextureAtlas,
    blend: BlendSettings,
    state: TransitionState,
    uniforms: ShaderUniforms,
    tween: Option<Tween>,
    detached: bool,
}

impl SlideController {
    /// Mount a controller over `len` slides, starting at slide 0.
    ///
    /// # Panics
    /// Panics if `len` is zero; [`crate::catalog::Catalog`] never is.
    #[must_use]
    pub fn new(len: usize, atlas: TextureAtlas, blend: BlendSettings) -> Self {
        assert!(len > 0, "slide controller needs at least one slide");
        let second = 1 % len;
        let uniforms = ShaderUniforms {
            texture_a: 0,
            texture_b: second,
            progress: 0.0,
            resolution: [1.0, 1.0],
            texture_a_size: atlas.size_of(0),
            texture_b_size: atlas.size_of(second),
        };
        Self {
            len,
            atlas,
            blend,
            state: TransitionState::mounted(),
            uniforms,
            tween: None,
            detached: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    #[must_use]
    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Start a blend toward `target`, or toward the next slide when `None`.
    ///
    /// The implicit next always starts, so a one-slide catalog blends slide 0
    /// into itself. Only an explicit request for the current slide is a no-op.
    pub fn request_transition(&mut self, target: Option<usize>, now: Duration) -> TransitionRequest {
        if self.detached {
            return TransitionRequest::Detached;
        }
        if self.state.transitioning {
            debug!(requested = ?target, "transition already in flight; request ignored");
            return TransitionRequest::Busy;
        }
        let from = self.state.current;
        let to = match target {
            Some(index) if index >= self.len => {
                debug!(target = index, len = self.len, "transition target out of range");
                return TransitionRequest::OutOfRange {
                    target: index,
                    len: self.len,
                };
            }
            Some(index) if index == from => return TransitionRequest::AlreadyActive,
            Some(index) => index,
            None => (from + 1) % self.len,
        };

        if let Some(mut residual) = self.tween.take() {
            residual.cancel();
        }

        self.state.transitioning = true;
        self.state.previous = Some(from);
        self.state.target = Some(to);
        self.state.blend_progress = 0.0;

        self.uniforms.texture_a = from;
        self.uniforms.texture_b = to;
        self.uniforms.texture_a_size = self.atlas.size_of(from);
        self.uniforms.texture_b_size = self.atlas.size_of(to);
        self.uniforms.progress = 0.0;

        self.tween = Some(Tween::start(
            TweenSpec::new(0.0, 1.0, self.blend.duration, self.blend.easing),
            now,
        ));
        debug!(from, to, duration_ms = self.blend.duration.as_millis(), "transition_start");
        TransitionRequest::Started { from, to }
    }

    /// Advance the blend. Returns the commit on the tick where it completes.
    pub fn tick(&mut self, now: Duration) -> Option<TransitionCommitted> {
        let tween = self.tween.as_mut()?;
        let resolution = tween.advance(now);
        self.state.blend_progress = tween.value();
        self.uniforms.progress = tween.value();
        match resolution {
            Some(Resolution::Completed) => {
                self.tween = None;
                Some(self.commit())
            }
            _ => None,
        }
    }

    fn commit(&mut self) -> TransitionCommitted {
        let from = self.state.current;
        let to = self.state.target.take().unwrap_or(from);
        self.state.transitioning = false;
        self.state.current = to;
        self.state.blend_progress = 0.0;
        self.uniforms.progress = 0.0;
        self.uniforms.texture_a = to;
        self.uniforms.texture_a_size = self.atlas.size_of(to);
        debug!(from, to, "transition_end");
        TransitionCommitted { from, to }
    }

    /// Cancel any in-flight blend. No commit is produced afterwards.
    pub fn teardown(&mut self) {
        if let Some(mut tween) = self.tween.take() {
            if tween.cancel().is_some() {
                debug!(target = ?self.state.target, "transition cancelled by teardown");
            }
        }
        self.state.transitioning = false;
        self.state.target = None;
        self.detached = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(len: usize) -> SlideController {
        SlideController::new(len, TextureAtlas::uniform(len, [1920, 1080]), BlendSettings::default())
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn implicit_next_wraps() {
        let mut ctl = controller(3);
        for expected in [1, 2, 0] {
            let from = ctl.state().current;
            assert_eq!(
                ctl.request_transition(None, Duration::ZERO),
                TransitionRequest::Started { from, to: expected }
            );
            ctl.tick(secs(5)).unwrap();
            assert_eq!(ctl.state().current, expected);
        }
    }

    #[test]
    fn busy_requests_leave_state_untouched() {
        let mut ctl = controller(4);
        assert!(ctl.request_transition(Some(2), Duration::ZERO).is_started());
        ctl.tick(secs(1));
        let snapshot = ctl.state().clone();
        let uniforms = *ctl.uniforms();
        assert_eq!(ctl.request_transition(Some(3), secs(1)), TransitionRequest::Busy);
        assert_eq!(ctl.request_transition(None, secs(1)), TransitionRequest::Busy);
        assert_eq!(ctl.state(), &snapshot);
        assert_eq!(ctl.uniforms(), &uniforms);
        let commit = ctl.tick(secs(5)).unwrap();
        assert_eq!(commit, TransitionCommitted { from: 0, to: 2 });
        assert_eq!(ctl.state().current, 2);
    }

    #[test]
    fn commit_resets_blend_and_repoints_primary_texture() {
        let mut ctl = SlideController::new(
            2,
            TextureAtlas::new(vec![Some([100, 50]), Some([40, 80])]),
            BlendSettings::default(),
        );
        let _ = ctl.request_transition(None, Duration::ZERO);
        assert_eq!(ctl.uniforms().texture_a, 0);
        assert_eq!(ctl.uniforms().texture_b, 1);
        ctl.tick(Duration::from_millis(2500));
        assert!(ctl.state().blend_progress > 0.5);
        ctl.tick(secs(5)).unwrap();
        let state = ctl.state();
        assert!(!state.transitioning);
        assert_eq!(state.blend_progress, 0.0);
        assert_eq!(state.previous, Some(0));
        assert_eq!(ctl.uniforms().texture_a, 1);
        assert_eq!(ctl.uniforms().texture_a_size, [40.0, 80.0]);
        assert_eq!(ctl.uniforms().progress, 0.0);
    }

    #[test]
    fn out_of_range_and_same_index_are_rejected() {
        let mut ctl = controller(4);
        assert_eq!(
            ctl.request_transition(Some(9), Duration::ZERO),
            TransitionRequest::OutOfRange { target: 9, len: 4 }
        );
        assert_eq!(ctl.request_transition(Some(0), Duration::ZERO), TransitionRequest::AlreadyActive);
        assert!(!ctl.state().transitioning);
        assert_eq!(ctl.state().previous, None);
    }

    #[test]
    fn single_slide_blends_into_itself() {
        let mut ctl = controller(1);
        assert_eq!(ctl.uniforms().texture_b, 0);
        assert_eq!(
            ctl.request_transition(None, Duration::ZERO),
            TransitionRequest::Started { from: 0, to: 0 }
        );
        assert!(ctl.state().transitioning);
        assert_eq!(ctl.state().previous, Some(0));
        assert_eq!(ctl.request_transition(None, secs(1)), TransitionRequest::Busy);
        assert_eq!(ctl.tick(secs(5)), Some(TransitionCommitted { from: 0, to: 0 }));
        assert_eq!(ctl.state().current, 0);
        assert!(!ctl.state().transitioning);
        assert_eq!(ctl.request_transition(Some(0), secs(6)), TransitionRequest::AlreadyActive);
    }

    #[test]
    fn missing_texture_uses_unit_size_and_keeps_guard() {
        let mut ctl = SlideController::new(
            3,
            TextureAtlas::new(vec![Some([10, 10]), None, Some([10, 10])]),
            BlendSettings::default(),
        );
        assert!(ctl.request_transition(Some(1), Duration::ZERO).is_started());
        assert_eq!(ctl.uniforms().texture_b_size, [1.0, 1.0]);
        assert_eq!(ctl.request_transition(Some(2), secs(1)), TransitionRequest::Busy);
    }

    #[test]
    fn teardown_cancels_without_commit() {
        let mut ctl = controller(4);
        let _ = ctl.request_transition(None, Duration::ZERO);
        ctl.tick(secs(2));
        ctl.teardown();
        assert_eq!(ctl.tick(secs(10)), None);
        assert_eq!(ctl.state().current, 0);
        assert_eq!(ctl.request_transition(None, secs(11)), TransitionRequest::Detached);
    }

    #[test]
    fn ticks_leave_resolution_to_the_compositor() {
        let mut ctl = controller(4);
        let _ = ctl.request_transition(None, Duration::ZERO);
        ctl.tick(secs(2));
        assert!(ctl.state().blend_progress > 0.0);
        assert_eq!(ctl.uniforms().resolution, [1.0, 1.0]);
    }
}
