use log::warn;
use std::time::Duration;

use crate::config::DurationUnit;
use crate::model::{Slide, SlideId};
use crate::schedule::slide_delay;

/// A slide reduced to what the player needs: where to point the surface and for how long
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSlide {
    pub slide_id: SlideId,
    pub url: String,
    pub delay: Duration,
}

impl TimedSlide {
    pub fn new(slide_id: SlideId, url: impl Into<String>, delay: Duration) -> Self {
        Self {
            slide_id,
            url: url.into(),
            delay,
        }
    }

    pub fn from_slide(slide: &Slide, unit: DurationUnit) -> Result<Self, String> {
        let delay = slide_delay(slide.time, unit)
            .map_err(|e| format!("Slide {} ('{}'): {}", slide.slide_id, slide.slide_title, e))?;
        Ok(Self::new(slide.slide_id, slide.url.clone(), delay))
    }
}

/// Build the rotation order for a board: enabled slides, in API order
///
/// Slides whose stored time cannot be turned into a wait are left out with a
/// warning rather than spinning the surface with a zero delay.
pub fn enabled_sequence(slides: &[Slide], unit: DurationUnit) -> Vec<TimedSlide> {
    slides
        .iter()
        .filter(|s| s.is_enabled())
        .filter_map(|s| match TimedSlide::from_slide(s, unit) {
            Ok(timed) => Some(timed),
            Err(e) => {
                warn!("Skipping slide in rotation: {}", e);
                None
            }
        })
        .collect()
}

/// Cursor over a non-empty slide sequence that wraps forever
#[derive(Debug, Clone)]
pub struct Rotation {
    slides: Vec<TimedSlide>,
    cursor: usize,
}

impl Rotation {
    /// Returns None for an empty sequence
    pub fn new(slides: Vec<TimedSlide>) -> Option<Self> {
        if slides.is_empty() {
            return None;
        }
        Some(Self { slides, cursor: 0 })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current(&self) -> &TimedSlide {
        &self.slides[self.cursor]
    }

    /// Move to the next slide, wrapping after the last one
    pub fn advance(&mut self) -> &TimedSlide {
        self.cursor = (self.cursor + 1) % self.slides.len();
        &self.slides[self.cursor]
    }
}
