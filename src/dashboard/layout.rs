//! Panel placement for appended graphs.
//!
//! Single-column stacking: every new graph spans the full width and goes
//! directly below the lowest existing panel. Placement stays collision-free
//! as long as panels are only appended and the board is re-read before each
//! placement.

use super::model::{GridPos, PANEL_HEIGHT, PANEL_WIDTH, Panel};

/// Where the next panel goes and which id it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub id: u64,
}

impl Placement {
    pub fn grid_pos(&self) -> GridPos {
        GridPos {
            h: PANEL_HEIGHT,
            w: PANEL_WIDTH,
            x: self.x,
            y: self.y,
        }
    }
}

/// Compute the placement of a new panel below `panels`.
///
/// Positions and ids come from the remote board, so arithmetic saturates
/// instead of overflowing on corrupt values.
pub fn next_placement(panels: &[Panel]) -> Placement {
    let y = panels
        .iter()
        .map(|p| p.grid_pos.y.saturating_add(p.grid_pos.h))
        .max()
        .unwrap_or(0);
    let id = panels
        .iter()
        .map(|p| p.id)
        .max()
        .unwrap_or(0)
        .saturating_add(1);
    Placement { x: 0, y, id }
}
