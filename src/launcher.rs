//! Caller side of the rotation player.
//!
//! Both the board list and the slide-management view start rotations through
//! here: fetch the board's slides, keep the enabled ones, start the player,
//! and turn every failure into a [`Notification`] instead of an error.

use log::{info, warn};
use std::time::Duration;

use crate::client::SlideSource;
use crate::config::DurationUnit;
use crate::model::{BoardId, SlideId};
use crate::notify::Notification;
use crate::player::{Player, RotationSession};
use crate::registry::SessionRegistry;
use crate::sequence::{enabled_sequence, TimedSlide};
use crate::surface::{Surface, SurfaceOpener};

/// Which view asked for the rotation; decides what an empty board means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// Board list: an empty board sends the user to slide creation
    BoardList,
    /// Slide management: an empty board is reported in place
    SlideManagement,
}

#[derive(Debug)]
pub enum LaunchOutcome {
    Started(RotationSession),
    /// The board has no enabled slide; the user should add one first
    NeedsSlides(BoardId),
    Failed(Notification),
}

impl LaunchOutcome {
    pub fn session(&self) -> Option<&RotationSession> {
        match self {
            LaunchOutcome::Started(session) => Some(session),
            _ => None,
        }
    }
}

/// Fetch a board's enabled slides and start rotating through them
pub fn launch_board(
    source: &dyn SlideSource,
    registry: &SessionRegistry,
    opener: &dyn SurfaceOpener,
    board_id: BoardId,
    unit: DurationUnit,
    entry: EntryPoint,
) -> LaunchOutcome {
    let slides = match source.list_slides_by_board(board_id) {
        Ok(slides) => slides,
        Err(e) => {
            warn!("Failed to list slides for board {}: {}", board_id, e);
            return LaunchOutcome::Failed(Notification::from_api_error(&e, "load slides"));
        }
    };

    let sequence = enabled_sequence(&slides, unit);
    if sequence.is_empty() {
        info!(
            "Board {} has no enabled slides ({} total)",
            board_id,
            slides.len()
        );
        return match entry {
            EntryPoint::BoardList => LaunchOutcome::NeedsSlides(board_id),
            EntryPoint::SlideManagement if slides.is_empty() => {
                LaunchOutcome::Failed(Notification::error("No slides to show."))
            }
            EntryPoint::SlideManagement => {
                LaunchOutcome::Failed(Notification::error("No enabled slides available."))
            }
        };
    }

    info!(
        "Board {}: rotating {} of {} slide(s), slide time read as {:?}",
        board_id,
        sequence.len(),
        slides.len(),
        unit
    );
    match registry.start(board_id, sequence, opener) {
        Ok(session) => LaunchOutcome::Started(session),
        Err(e) => {
            warn!("Could not start rotation for board {}: {}", board_id, e);
            LaunchOutcome::Failed(Notification::from(&e))
        }
    }
}

/// Show one chosen slide of a board, enabled or not, without rotating
pub fn show_selected(
    source: &dyn SlideSource,
    player: &Player,
    opener: &dyn SurfaceOpener,
    board_id: BoardId,
    slide_id: SlideId,
) -> Result<Box<dyn Surface>, Notification> {
    let slides = source
        .list_slides_by_board(board_id)
        .map_err(|e| Notification::from_api_error(&e, "load slides"))?;
    let slide = slides
        .iter()
        .find(|s| s.slide_id == slide_id)
        .ok_or_else(|| Notification::error(format!("Slide {} not found.", slide_id)))?;

    let target = TimedSlide::new(slide.slide_id, slide.url.clone(), Duration::ZERO);
    player
        .show_one(&target, opener)
        .map_err(|e| Notification::from(&e))
}
