//! Text content blocks: split-text cache and the per-slide enter/exit
//! animations of title, description and metadata list.

use std::collections::HashMap;
use std::time::Duration;

use crate::timeline::{Easing, Resolution, Stagger, TweenGroup, TweenSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentPart {
    /// Split into characters.
    Title,
    /// Metadata rows, split into lines.
    List,
}

/// Identity of one text element: which slide, which part of its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub slide: usize,
    pub part: ContentPart,
}

impl ElementId {
    #[must_use]
    pub fn new(slide: usize, part: ContentPart) -> Self {
        Self { slide, part }
    }
}

/// A text broken into animatable pieces. Whitespace never becomes a char and
/// blank lines are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitText {
    pub chars: Vec<char>,
    pub lines: Vec<String>,
}

impl SplitText {
    #[must_use]
    pub fn split(text: &str) -> Self {
        Self {
            chars: text.chars().filter(|c| !c.is_whitespace()).collect(),
            lines: text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Split results cached per element for the lifetime of one mounted slider.
#[derive(Debug, Default)]
pub struct SplitCache {
    entries: HashMap<ElementId, SplitText>,
}

impl SplitCache {
    pub fn get_or_split(&mut self, id: ElementId, text: &str) -> &SplitText {
        self.entries
            .entry(id)
            .or_insert_with(|| SplitText::split(text))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached split; returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }
}

/// Lifecycle of one slide's text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidePhase {
    Hidden,
    Entering,
    Visible,
    Exiting,
}

const TITLE_DURATION: Duration = Duration::from_secs(1);
const TITLE_STAGGER: Duration = Duration::from_millis(100);
const DESCRIPTION_DURATION: Duration = Duration::from_secs(1);
const DESCRIPTION_DELAY: Duration = Duration::from_millis(200);
const LIST_DURATION: Duration = Duration::from_millis(1200);
const LIST_DELAY: Duration = Duration::from_millis(200);
const LIST_STAGGER: Duration = Duration::from_millis(50);

/// Resting values plus the group currently animating them, if any.
#[derive(Debug, Clone)]
struct Track {
    rest: Vec<f32>,
    group: Option<TweenGroup>,
}

impl Track {
    fn settled(count: usize, value: f32) -> Self {
        Self {
            rest: vec![value; count],
            group: None,
        }
    }

    fn values(&self) -> Vec<f32> {
        match &self.group {
            Some(group) => group.values(),
            None => self.rest.clone(),
        }
    }

    fn play(&mut self, group: TweenGroup) {
        self.cancel();
        self.group = Some(group);
    }

    fn settle(&mut self, value: f32) {
        self.cancel();
        self.rest.iter_mut().for_each(|v| *v = value);
    }

    /// True once no animation is running on this track.
    fn advance(&mut self, now: Duration) -> bool {
        let Some(group) = self.group.as_mut() else {
            return true;
        };
        if group.advance(now) == Some(Resolution::Completed) {
            self.rest = group.values();
            self.group = None;
            return true;
        }
        false
    }

    fn cancel(&mut self) {
        if let Some(mut group) = self.group.take() {
            self.rest = group.values();
            group.cancel();
        }
    }
}

/// Animated values of one slide's content, as read by a presenter.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideContent {
    pub phase: SlidePhase,
    /// Vertical offset of each title character, in percent of its height.
    pub title_offsets: Vec<f32>,
    pub description_alpha: f32,
    /// Vertical offset of each metadata row, in percent of its height.
    pub list_offsets: Vec<f32>,
}

impl SlideContent {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.phase != SlidePhase::Hidden
    }
}

#[derive(Debug, Clone)]
pub struct ContentBlock {
    phase: SlidePhase,
    title: Track,
    description: Track,
    list: Track,
}

impl ContentBlock {
    #[must_use]
    pub fn hidden(title_chars: usize, list_rows: usize) -> Self {
        Self {
            phase: SlidePhase::Hidden,
            title: Track::settled(title_chars, -100.0),
            description: Track::settled(1, 0.0),
            list: Track::settled(list_rows, -100.0),
        }
    }

    #[must_use]
    pub fn phase(&self) -> SlidePhase {
        self.phase
    }

    pub fn enter(&mut self, now: Duration) {
        self.phase = SlidePhase::Entering;
        self.play(-100.0, 0.0, 0.0, 1.0, now);
    }

    pub fn exit(&mut self, now: Duration) {
        self.phase = SlidePhase::Exiting;
        self.play(0.0, 100.0, 1.0, 0.0, now);
    }

    fn play(&mut self, offset_from: f32, offset_to: f32, alpha_from: f32, alpha_to: f32, now: Duration) {
        let chars = self.title.rest.len();
        let rows = self.list.rest.len();
        self.title.play(TweenGroup::start(
            TweenSpec::new(offset_from, offset_to, TITLE_DURATION, Easing::Power2Out),
            chars,
            Stagger::FromCenter(TITLE_STAGGER),
            now,
        ));
        self.description.play(TweenGroup::start(
            TweenSpec::new(alpha_from, alpha_to, DESCRIPTION_DURATION, Easing::Power2Out)
                .delayed(DESCRIPTION_DELAY),
            1,
            Stagger::Each(Duration::ZERO),
            now,
        ));
        self.list.play(TweenGroup::start(
            TweenSpec::new(offset_from, offset_to, LIST_DURATION, Easing::Power3Out)
                .delayed(LIST_DELAY),
            rows,
            Stagger::Each(LIST_STAGGER),
            now,
        ));
    }

    /// Force the block out of view without animating.
    pub fn hide(&mut self) {
        self.phase = SlidePhase::Hidden;
        self.title.settle(-100.0);
        self.description.settle(0.0);
        self.list.settle(-100.0);
    }

    /// Advance running animations; returns the new phase when it changed.
    pub fn advance(&mut self, now: Duration) -> Option<SlidePhase> {
        if !matches!(self.phase, SlidePhase::Entering | SlidePhase::Exiting) {
            return None;
        }
        let title = self.title.advance(now);
        let description = self.description.advance(now);
        let list = self.list.advance(now);
        if !(title && description && list) {
            return None;
        }
        self.phase = match self.phase {
            SlidePhase::Entering => SlidePhase::Visible,
            _ => {
                self.hide();
                SlidePhase::Hidden
            }
        };
        Some(self.phase)
    }

    /// Stop every running animation where it is.
    pub fn cancel(&mut self) {
        self.title.cancel();
        self.description.cancel();
        self.list.cancel();
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        [&self.title, &self.description, &self.list]
            .iter()
            .any(|t| t.group.as_ref().is_some_and(TweenGroup::is_running))
    }

    #[must_use]
    pub fn snapshot(&self) -> SlideContent {
        SlideContent {
            phase: self.phase,
            title_offsets: self.title.values(),
            description_alpha: self.description.values().first().copied().unwrap_or(0.0),
            list_offsets: self.list.values(),
        }
    }
}
