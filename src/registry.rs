use log::info;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::ConcurrentStart;
use crate::model::BoardId;
use crate::player::{Player, PlayerError, RotationSession};
use crate::sequence::TimedSlide;
use crate::surface::SurfaceOpener;

/// Live rotation sessions keyed by board
///
/// The registry applies the configured `ConcurrentStart` policy when a second
/// rotation is requested for a board whose previous one is still running.
pub struct SessionRegistry {
    player: Player,
    policy: ConcurrentStart,
    sessions: Mutex<HashMap<BoardId, Vec<RotationSession>>>,
}

impl SessionRegistry {
    pub fn new(player: Player, policy: ConcurrentStart) -> Self {
        Self {
            player,
            policy,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn policy(&self) -> ConcurrentStart {
        self.policy
    }

    pub fn start(
        &self,
        board_id: BoardId,
        slides: Vec<TimedSlide>,
        opener: &dyn SurfaceOpener,
    ) -> Result<RotationSession, PlayerError> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let running = sessions.entry(board_id).or_default();
        running.retain(|s| s.is_active());

        if !running.is_empty() {
            match self.policy {
                ConcurrentStart::Allow => {}
                ConcurrentStart::Reject => return Err(PlayerError::SessionActive(board_id)),
                ConcurrentStart::Replace => {
                    for old in running.drain(..) {
                        info!("[{}] Replacing rotation for board {}", old.id(), board_id);
                        old.stop();
                    }
                }
            }
        }

        let session = self.player.start(slides, opener)?;
        running.push(session.clone());
        Ok(session)
    }

    /// Stop every session of a board; returns how many were running
    pub fn stop_board(&self, board_id: BoardId) -> usize {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&board_id)
            .unwrap_or_default();
        let count = removed.iter().filter(|s| s.is_active()).count();
        for session in removed {
            session.stop();
        }
        count
    }

    pub fn active_count(&self, board_id: BoardId) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&board_id)
            .map(|running| running.iter().filter(|s| s.is_active()).count())
            .unwrap_or(0)
    }

    pub fn stop_all(&self) {
        let all: Vec<RotationSession> = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain()
            .flat_map(|(_, running)| running)
            .collect();
        for session in all {
            session.stop();
        }
    }
}
