//! Pagination and autoplay: the repeating advance timer, manual slide
//! selection, per-slide progress rings and the text block phases.
//!
//! Every effect here is keyed off the controller's accepted transitions. The
//! driver never tracks blend progress itself.

use std::time::Duration;

use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::text::{ContentBlock, ContentPart, ElementId, SlideContent, SlidePhase, SplitCache};
use crate::timeline::{Easing, IntervalTimer, Tween, TweenSpec};
use crate::transition::{SlideController, TransitionRequest};

/// One thumbnail of the pagination strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationItem {
    pub index: usize,
    pub active: bool,
    /// Fraction of the thumbnail still uncovered by the progress ring.
    pub inset: f32,
}

pub struct Pagination {
    catalog: Catalog,
    active: usize,
    timer: IntervalTimer,
    ring: Option<Tween>,
    /// Built on a slide's first activation, from the split cache.
    blocks: Vec<Option<ContentBlock>>,
    splits: SplitCache,
    mounted: bool,
}

impl Pagination {
    /// Arm autoplay and play the first slide's enter animation.
    #[must_use]
    pub fn mount(catalog: Catalog, interval: Duration, now: Duration) -> Self {
        let blocks = vec![None; catalog.len()];
        let mut pagination = Self {
            catalog,
            active: 0,
            timer: IntervalTimer::new(interval),
            ring: None,
            blocks,
            splits: SplitCache::default(),
            mounted: true,
        };
        pagination.activate(None, 0, now);
        pagination
    }

    #[must_use]
    pub fn active(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.timer.period()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn split_cache(&self) -> &SplitCache {
        &self.splits
    }

    /// Manual selection. Shares the controller guard with autoplay.
    pub fn go_to_slide(
        &mut self,
        controller: &mut SlideController,
        index: usize,
        now: Duration,
    ) -> TransitionRequest {
        if !self.mounted {
            return TransitionRequest::Detached;
        }
        if controller.state().transitioning {
            return TransitionRequest::Busy;
        }
        let request = controller.request_transition(Some(index), now);
        if let TransitionRequest::Started { from, to } = request {
            self.activate(Some(from), to, now);
        }
        request
    }

    /// Fire the autoplay timer if due, advancing to the slide after the
    /// active one.
    pub fn poll_autoplay(
        &mut self,
        controller: &mut SlideController,
        now: Duration,
    ) -> Option<TransitionRequest> {
        if !self.mounted || !self.timer.poll(now) {
            return None;
        }
        let next = self.catalog.next_index(self.active);
        trace!(next, "autoplay tick");
        Some(self.go_to_slide(controller, next, now))
    }

    /// Reconcile with a transition the controller accepted from elsewhere.
    pub fn on_transition_started(&mut self, from: usize, to: usize, now: Duration) {
        if self.mounted {
            self.activate(Some(from), to, now);
        }
    }

    fn activate(&mut self, from: Option<usize>, to: usize, now: Duration) {
        debug!(?from, to, "pagination active slide changed");
        self.active = to;
        self.timer.restart(now);
        self.ring = Some(Tween::start(
            TweenSpec::new(1.0, 0.0, self.timer.period(), Easing::Linear),
            now,
        ));

        // Only the outgoing and incoming blocks may animate.
        for (index, slot) in self.blocks.iter_mut().enumerate() {
            if let Some(block) = slot.as_mut().filter(|_| Some(index) != from && index != to) {
                block.hide();
            }
        }
        if let Some(from) = from.filter(|&f| f != to) {
            if let Some(block) = self.block_mut(from) {
                block.exit(now);
            }
        }
        if let Some(block) = self.block_mut(to) {
            block.enter(now);
        }
    }

    /// The text block of `index`, splitting its title and metadata rows on
    /// first use.
    fn block_mut(&mut self, index: usize) -> Option<&mut ContentBlock> {
        let slide = self.catalog.get(index)?;
        let slot = self.blocks.get_mut(index)?;
        if slot.is_none() {
            let chars = self
                .splits
                .get_or_split(ElementId::new(index, ContentPart::Title), &slide.title)
                .chars
                .len();
            let rows: Vec<String> = slide
                .metadata_rows()
                .iter()
                .map(|(label, value)| format!("{label} {value}"))
                .collect();
            let rows = self
                .splits
                .get_or_split(ElementId::new(index, ContentPart::List), &rows.join("\n"))
                .lines
                .len();
            trace!(index, chars, rows, "content split");
            *slot = Some(ContentBlock::hidden(chars, rows));
        }
        slot.as_mut()
    }

    /// Advance ring and text animations.
    pub fn advance(&mut self, now: Duration) {
        if !self.mounted {
            return;
        }
        if let Some(ring) = self.ring.as_mut() {
            ring.advance(now);
        }
        for (index, block) in self.blocks.iter_mut().enumerate() {
            let Some(block) = block.as_mut() else {
                continue;
            };
            if let Some(phase) = block.advance(now) {
                trace!(index, ?phase, "content phase changed");
            }
        }
    }

    #[must_use]
    pub fn items(&self) -> Vec<PaginationItem> {
        (0..self.catalog.len())
            .map(|index| {
                let active = index == self.active;
                let inset = match (&self.ring, active) {
                    (Some(ring), true) => ring.value(),
                    _ => 1.0,
                };
                PaginationItem {
                    index,
                    active,
                    inset,
                }
            })
            .collect()
    }

    /// Phase of slide `index`; slides never shown yet are `Hidden`.
    #[must_use]
    pub fn phase(&self, index: usize) -> Option<SlidePhase> {
        self.blocks
            .get(index)
            .map(|slot| slot.as_ref().map_or(SlidePhase::Hidden, ContentBlock::phase))
    }

    /// Animated text values of slide `index`; `None` until it was first shown.
    #[must_use]
    pub fn content(&self, index: usize) -> Option<SlideContent> {
        self.blocks.get(index)?.as_ref().map(ContentBlock::snapshot)
    }

    /// Cancel the timer, the ring and every text animation, and release the
    /// split cache.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.timer.cancel();
        if let Some(ring) = self.ring.as_mut() {
            ring.cancel();
        }
        for block in self.blocks.iter_mut().flatten() {
            block.cancel();
        }
        let released = self.splits.clear();
        debug!(released, "pagination unmounted");
    }
}
