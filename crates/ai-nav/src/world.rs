use ai_core::WorldMut;

use crate::Vec3;

/// Outcome of asking the host's path planner to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Succeeded,
    Failed,
    PathGenerationFailed,
}

impl MoveResult {
    /// The planner could not make progress and a fallback strategy is needed.
    pub fn needs_fallback(self) -> bool {
        matches!(self, MoveResult::Failed | MoveResult::PathGenerationFailed)
    }
}

/// Movement queries and commands for the agent being driven.
pub trait MovementWorld: WorldMut {
    fn position(&self) -> Vec3;

    fn is_moving(&self) -> bool;

    /// Planner-driven movement towards `destination`.
    fn move_to(&mut self, destination: Vec3) -> MoveResult;

    /// Straight-line movement that bypasses the planner.
    fn direct_move(&mut self, destination: Vec3);

    fn stop_moving(&mut self);

    /// Arrival tolerance used when a caller does not supply one.
    fn path_precision(&self) -> f32 {
        1.5
    }
}
