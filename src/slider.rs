//! A mounted slider: controller, compositor and pagination wired together.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::compositor::{Compositor, RenderSurface};
use crate::events::SlideEvent;
use crate::pagination::{Pagination, PaginationItem};
use crate::text::SlideContent;
use crate::transition::{
    BlendSettings, SlideController, TextureAtlas, TransitionRequest, TransitionState,
};

/// Timing knobs for one slider instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSettings {
    pub blend: BlendSettings,
    pub autoplay_interval: Duration,
    pub resize_debounce: Duration,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            blend: BlendSettings::default(),
            autoplay_interval: Duration::from_secs(5),
            resize_debounce: Duration::from_millis(100),
        }
    }
}

pub struct Slider<S> {
    catalog: Catalog,
    controller: SlideController,
    compositor: Compositor<S>,
    pagination: Pagination,
    settings: SliderSettings,
    resizing_until: Option<Duration>,
    mounted: bool,
}

impl<S: RenderSurface> Slider<S> {
    /// Mount at slide 0 with autoplay armed from `now`.
    pub fn mount(
        catalog: Catalog,
        atlas: TextureAtlas,
        surface: S,
        size: (u32, u32),
        settings: SliderSettings,
        now: Duration,
    ) -> Self {
        let controller = SlideController::new(catalog.len(), atlas, settings.blend);
        let compositor = Compositor::new(surface, size.0, size.1);
        let pagination = Pagination::mount(catalog.clone(), settings.autoplay_interval, now);
        info!(
            slides = catalog.len(),
            interval = %humantime::format_duration(settings.autoplay_interval),
            "slider mounted"
        );
        Self {
            catalog,
            controller,
            compositor,
            pagination,
            settings,
            resizing_until: None,
            mounted: true,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn state(&self) -> &TransitionState {
        self.controller.state()
    }

    #[must_use]
    pub fn controller(&self) -> &SlideController {
        &self.controller
    }

    #[must_use]
    pub fn compositor(&self) -> &Compositor<S> {
        &self.compositor
    }

    #[must_use]
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn is_resizing(&self) -> bool {
        self.resizing_until.is_some()
    }

    #[must_use]
    pub fn items(&self) -> Vec<PaginationItem> {
        self.pagination.items()
    }

    #[must_use]
    pub fn content(&self, index: usize) -> Option<SlideContent> {
        self.pagination.content(index)
    }

    /// Manual slide selection (thumbnail click, key press, command).
    pub fn go_to_slide(&mut self, index: usize, now: Duration) -> TransitionRequest {
        let request = self.pagination.go_to_slide(&mut self.controller, index, now);
        log_request(request);
        request
    }

    /// Advance to the following slide through the guarded controller.
    pub fn next(&mut self, now: Duration) -> TransitionRequest {
        if !self.mounted {
            return TransitionRequest::Detached;
        }
        let request = self.controller.request_transition(None, now);
        if let TransitionRequest::Started { from, to } = request {
            self.pagination.on_transition_started(from, to, now);
        }
        log_request(request);
        request
    }

    /// Advance everything to `now` and present a frame.
    ///
    /// The blend commit runs before the autoplay timer so a timer firing on
    /// the same tick sees the finished transition.
    ///
    /// # Errors
    /// Propagates surface draw failures.
    pub fn tick(&mut self, now: Duration) -> Result<Vec<SlideEvent>> {
        let mut events = Vec::new();
        if !self.mounted {
            return Ok(events);
        }

        if let Some(commit) = self.controller.tick(now) {
            info!(from = commit.from, to = commit.to, "slide committed");
            events.push(SlideEvent::SlideCommitted(commit.to));
        }

        if let Some(request) = self.pagination.poll_autoplay(&mut self.controller, now) {
            log_request(request);
            if let TransitionRequest::Started { from, to } = request {
                events.push(SlideEvent::TransitionStarted { from, to });
            }
        }

        self.pagination.advance(now);

        if let Some(until) = self.resizing_until {
            if now < until {
                return Ok(events);
            }
            self.resizing_until = None;
            debug!("resize settled; resuming frames");
        }
        self.compositor.present(self.controller.uniforms())?;
        Ok(events)
    }

    /// The drawable area changed. Frames pause until resizes stop for the
    /// debounce window; the blend keeps running meanwhile.
    pub fn resize(&mut self, width: u32, height: u32, now: Duration) {
        if !self.mounted {
            return;
        }
        self.compositor.resize(width, height);
        self.resizing_until = Some(now.saturating_add(self.settings.resize_debounce));
    }

    /// Tear down: cancel the blend, autoplay, text animations and caches.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.controller.teardown();
        self.pagination.unmount();
        info!("slider unmounted");
    }
}

impl<S> Drop for Slider<S> {
    fn drop(&mut self) {
        if self.mounted {
            self.controller.teardown();
            self.pagination.unmount();
        }
    }
}

fn log_request(request: TransitionRequest) {
    match request {
        TransitionRequest::Started { from, to } => info!(from, to, "transition started"),
        TransitionRequest::OutOfRange { target, len } => {
            warn!(requested = target, len, "ignoring slide request outside the catalog");
        }
        other => debug!(?other, "slide request ignored"),
    }
}
