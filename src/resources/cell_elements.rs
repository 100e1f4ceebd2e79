use bevy::prelude::*;

use super::{Mark, Position};

/// The entity currently drawn for each board position, and what it shows.
///
/// Redrawing a position replaces its entity, so there is never more than one
/// element per cell.
#[derive(Resource, Default, Debug)]
pub struct CellElements([Option<(Entity, Mark)>; Position::COUNT]);

impl CellElements {
    pub fn get(&self, position: Position) -> Option<Entity> {
        self.0[position.index()].map(|(entity, _)| entity)
    }

    pub fn mark(&self, position: Position) -> Option<Mark> {
        self.0[position.index()].map(|(_, mark)| mark)
    }

    /// Stores `entity` for `position` and hands back the one it displaced.
    pub fn replace(&mut self, position: Position, entity: Entity, mark: Mark) -> Option<Entity> {
        self.0[position.index()]
            .replace((entity, mark))
            .map(|(previous, _)| previous)
    }

    /// Forgets every blank, returning their entities.
    pub fn take_blanks(&mut self) -> Vec<Entity> {
        self.0
            .iter_mut()
            .filter(|slot| matches!(slot, Some((_, Mark::Empty))))
            .filter_map(|slot| slot.take().map(|(entity, _)| entity))
            .collect()
    }
}
