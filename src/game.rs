use thiserror::Error;

use crate::protocol::GameSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    #[error("no game state received yet")]
    NoSnapshot,

    #[error("game state is missing {0}")]
    MissingField(&'static str),
}

pub type GameResult<T> = std::result::Result<T, GameStateError>;

/// Read-only view of the game the overlay needs each frame.
pub trait GameState {
    fn has_target(&self) -> GameResult<bool>;

    /// 3D distance to the selected target, `None` without a target.
    fn target_distance(&self) -> GameResult<Option<f32>>;

    fn player_heading(&self) -> GameResult<f32>;

    fn heading_to_target(&self) -> GameResult<f32>;

    /// Display name of the logged-in character, if the game exposes one.
    fn player_name(&self) -> GameResult<Option<String>>;
}

/// Latest snapshot pushed through the ingest server.
#[derive(Debug, Default, Clone)]
pub struct LiveGameState {
    latest: Option<GameSnapshot>,
}

impl LiveGameState {
    pub fn apply(&mut self, snapshot: GameSnapshot) {
        self.latest = Some(snapshot);
    }

    pub fn is_connected(&self) -> bool {
        self.latest.is_some()
    }

    fn snapshot(&self) -> GameResult<&GameSnapshot> {
        self.latest.as_ref().ok_or(GameStateError::NoSnapshot)
    }
}

impl GameState for LiveGameState {
    fn has_target(&self) -> GameResult<bool> {
        Ok(self.snapshot()?.has_target)
    }

    fn target_distance(&self) -> GameResult<Option<f32>> {
        let snapshot = self.snapshot()?;
        if !snapshot.has_target {
            return Ok(None);
        }
        snapshot
            .target_distance
            .map(Some)
            .ok_or(GameStateError::MissingField("target_distance"))
    }

    fn player_heading(&self) -> GameResult<f32> {
        Ok(self.snapshot()?.player_heading)
    }

    fn heading_to_target(&self) -> GameResult<f32> {
        self.snapshot()?
            .heading_to_target
            .ok_or(GameStateError::MissingField("heading_to_target"))
    }

    fn player_name(&self) -> GameResult<Option<String>> {
        Ok(self
            .snapshot()?
            .player_name
            .clone()
            .filter(|name| !name.trim().is_empty()))
    }
}
