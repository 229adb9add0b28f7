use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::{Catalog, SlideRecord};
use crate::error::Error;
use crate::slider::SliderSettings;
use crate::timeline::Easing;
use crate::transition::BlendSettings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// How long one crossfade takes.
    #[serde(with = "humantime_serde")]
    pub transition_duration: Duration,
    pub transition_easing: Easing,
    /// Time between automatic advances, measured from the last transition.
    #[serde(with = "humantime_serde")]
    pub autoplay_interval: Duration,
    /// Quiet period after the last resize before frames resume.
    #[serde(with = "humantime_serde")]
    pub resize_debounce: Duration,
    /// Tick period of the headless driver.
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
    pub window_title: String,
    pub fullscreen: bool,
    /// Slides to show; the built-in catalog is used when absent.
    pub slides: Option<Vec<SlideRecord>>,
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            transition_duration: Duration::from_secs(5),
            transition_easing: Easing::Power1Out,
            autoplay_interval: Duration::from_secs(5),
            resize_debounce: Duration::from_millis(100),
            frame_interval: Duration::from_millis(16),
            window_title: "Opal Slider".to_owned(),
            fullscreen: false,
            slides: None,
            base_dir: None,
        }
    }
}

impl Configuration {
    /// Load from a YAML file. Relative slide images resolve against the
    /// file's directory.
    ///
    /// # Errors
    /// [`Error::Io`] when the file cannot be read, [`Error::Config`] when it
    /// is not a valid configuration.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut cfg: Self = serde_yaml::from_str(&text)?;
        cfg.base_dir = path.parent().map(Path::to_path_buf);
        Ok(cfg)
    }

    pub fn validated(self) -> Result<Self, Error> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("transition-duration", self.transition_duration),
            ("autoplay-interval", self.autoplay_interval),
            ("frame-interval", self.frame_interval),
        ];
        for (key, value) in positive {
            if value.is_zero() {
                return Err(Error::InvalidConfig(format!("{key} must be positive")));
            }
        }
        if let Some(slides) = &self.slides {
            if slides.is_empty() {
                return Err(Error::InvalidConfig(
                    "slides must list at least one slide".to_owned(),
                ));
            }
            if let Some(index) = slides.iter().position(|s| s.image.as_os_str().is_empty()) {
                return Err(Error::InvalidConfig(format!(
                    "slide {index} has an empty image path"
                )));
            }
        }
        Ok(())
    }

    /// The catalog to show, with image paths rooted at the config directory.
    pub fn catalog(&self) -> Result<Catalog, Error> {
        let catalog = match &self.slides {
            Some(slides) => Catalog::from_vec(slides.clone())?,
            None => Catalog::builtin(),
        };
        Ok(match &self.base_dir {
            Some(base) => catalog.rooted_at(base),
            None => catalog,
        })
    }

    #[must_use]
    pub fn slider_settings(&self) -> SliderSettings {
        SliderSettings {
            blend: BlendSettings {
                duration: self.transition_duration,
                easing: self.transition_easing,
            },
            autoplay_interval: self.autoplay_interval,
            resize_debounce: self.resize_debounce,
        }
    }
}
