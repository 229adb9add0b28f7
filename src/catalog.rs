//! Static, ordered slide catalog shown by the slider.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// One slide: the image shown by the compositor plus its text block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlideRecord {
    pub image: PathBuf,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub field: String,
    pub date: String,
}

impl SlideRecord {
    /// Metadata rows rendered under the description, in display order.
    #[must_use]
    pub fn metadata_rows(&self) -> [(&'static str, &str); 3] {
        [
            ("Type.", self.kind.as_str()),
            ("Field.", self.field.as_str()),
            ("Date.", self.date.as_str()),
        ]
    }
}

/// Non-empty ordered list of slides. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    slides: Vec<SlideRecord>,
}

impl Catalog {
    /// Construct a catalog from a list of slides.
    ///
    /// # Errors
    /// Returns [`Error::EmptyCatalog`] if `slides` is empty.
    pub fn from_vec(slides: Vec<SlideRecord>) -> Result<Self, Error> {
        if slides.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self { slides })
    }

    /// The portfolio catalog shipped with the slider.
    #[must_use]
    pub fn builtin() -> Self {
        let slide = |image: &str, title: &str, description: &str, kind: &str, field: &str, date: &str| {
            SlideRecord {
                image: PathBuf::from(image),
                title: title.to_owned(),
                description: description.to_owned(),
                kind: kind.to_owned(),
                field: field.to_owned(),
                date: date.to_owned(),
            }
        };
        Self {
            slides: vec![
                slide(
                    "slides/slide-1.jpeg",
                    "Echo Forms",
                    "A generative art experiment that visualizes sound vibrations through blurred motion and abstract shapes. The project explores the intersection of audio input and fluid visuals.",
                    "Experimental Visual",
                    "Creative Coding / Motion Design",
                    "March 2025",
                ),
                slide(
                    "slides/slide-2.jpeg",
                    "Dream Mesh",
                    "An ambient visual series that distorts geometric grids into flowing, organic compositions. Inspired by lucid dreaming states and soft color transitions.",
                    "Visual Series",
                    "Digital Art / Abstract UI Concepts",
                    "February 2025",
                ),
                slide(
                    "slides/slide-3.png",
                    "Mist UI",
                    "A conceptual UI design where interface elements melt into the background, emphasizing atmosphere over clarity. Designed for meditation or ambient music platforms.",
                    "UI Concept",
                    "Product Design / Experimental UI",
                    "April 2025",
                ),
                slide(
                    "slides/slide-4.jpeg",
                    "Phantom Flow",
                    "A kinetic art piece simulating emotional rhythms using shifting gradients and diffused shapes. It reflects how moods ebb and flow in a digital environment.",
                    "Motion Graphic",
                    "Visual Storytelling / Emotion Design",
                    "January 2025",
                ),
            ],
        }
    }

    /// Resolve relative image paths against `base`.
    #[must_use]
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for slide in &mut self.slides {
            if slide.image.is_relative() {
                slide.image = base.join(&slide.image);
            }
        }
        self
    }

    /// Number of slides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SlideRecord> {
        self.slides.get(index)
    }

    /// Index following `index`, wrapping at the end.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.slides.len()
    }

    /// Borrow the slides (read-only).
    #[must_use]
    pub fn as_slice(&self) -> &[SlideRecord] {
        &self.slides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(Catalog::from_vec(Vec::new()), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn next_index_wraps() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.next_index(0), 1);
        assert_eq!(catalog.next_index(3), 0);
    }

    #[test]
    fn rooted_at_keeps_absolute_paths() {
        let mut slides = Catalog::builtin().as_slice().to_vec();
        slides[0].image = PathBuf::from("/srv/a.jpg");
        let catalog = Catalog::from_vec(slides)
            .unwrap()
            .rooted_at(Path::new("/etc/slider"));
        assert_eq!(catalog.get(0).unwrap().image, PathBuf::from("/srv/a.jpg"));
        assert_eq!(
            catalog.get(1).unwrap().image,
            PathBuf::from("/etc/slider/slides/slide-2.jpeg")
        );
    }
}
