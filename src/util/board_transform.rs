//! Maps between board units (a 3×3 square, one unit per cell) and screen pixels.

use eframe::egui::{Pos2, Rect};

use crate::game::CELL_COUNT;

/// Cells per row and per column.
pub const BOARD_SIDE: usize = 3;

/// Empty space left around the board, in board units.
const MARGIN: f32 = 0.25;

/// A uniform scale plus translation that fits the board, with margin, inside a screen rect.
/// The board stays square; the leftover space on the longer axis is split evenly.
pub struct BoardTransform {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl BoardTransform {
    pub fn new_letterboxed(screen: Rect) -> Self {
        let extent = BOARD_SIDE as f32 + 2.0 * MARGIN;
        let scale = (screen.width() / extent).min(screen.height() / extent);
        let board_px = BOARD_SIDE as f32 * scale;
        Self {
            scale,
            offset_x: screen.center().x - board_px / 2.0,
            offset_y: screen.center().y - board_px / 2.0,
        }
    }

    /// Board units to screen pixels.
    pub fn map_point(&self, p: Pos2) -> Pos2 {
        Pos2::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }

    /// Screen pixels to board units. Returns `None` for a degenerate (zero-sized) screen rect.
    pub fn unmap_point(&self, p: Pos2) -> Option<Pos2> {
        if self.scale <= 0.0 {
            return None;
        }
        Some(Pos2::new(
            (p.x - self.offset_x) / self.scale,
            (p.y - self.offset_y) / self.scale,
        ))
    }

    pub fn map_dist(&self, d: f32) -> f32 {
        d * self.scale
    }

    pub fn board_rect(&self) -> Rect {
        let side = BOARD_SIDE as f32;
        Rect::from_two_pos(
            self.map_point(Pos2::ZERO),
            self.map_point(Pos2::new(side, side)),
        )
    }

    /// Screen rect of the cell at `index` (row-major).
    pub fn cell_rect(&self, index: usize) -> Rect {
        let col = (index % BOARD_SIDE) as f32;
        let row = (index / BOARD_SIDE) as f32;
        Rect::from_two_pos(
            self.map_point(Pos2::new(col, row)),
            self.map_point(Pos2::new(col + 1.0, row + 1.0)),
        )
    }

    /// Index of the cell under the screen point, if any.
    pub fn cell_at(&self, screen: Pos2) -> Option<usize> {
        let p = self.unmap_point(screen)?;
        let side = BOARD_SIDE as f32;
        if !(0.0..side).contains(&p.x) || !(0.0..side).contains(&p.y) {
            return None;
        }
        let index = p.y as usize * BOARD_SIDE + p.x as usize;
        (index < CELL_COUNT).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide() -> BoardTransform {
        // 700x350 screen: height limits, board is 300px square centered horizontally.
        BoardTransform::new_letterboxed(Rect::from_min_max(
            Pos2::new(0.0, 0.0),
            Pos2::new(700.0, 350.0),
        ))
    }

    #[test]
    fn test_board_is_centered_and_square() {
        let board = wide().board_rect();
        assert_eq!(board.width(), 300.0);
        assert_eq!(board.height(), 300.0);
        assert_eq!(board.center(), Pos2::new(350.0, 175.0));
    }

    #[test]
    fn test_cell_rects_are_row_major() {
        let t = wide();
        assert_eq!(t.cell_rect(0).min, Pos2::new(200.0, 25.0));
        assert_eq!(t.cell_rect(5).min, Pos2::new(400.0, 125.0));
        assert_eq!(t.cell_rect(8).max, Pos2::new(500.0, 325.0));
    }

    #[test]
    fn test_hit_testing() {
        let t = wide();
        for index in 0..CELL_COUNT {
            assert_eq!(t.cell_at(t.cell_rect(index).center()), Some(index));
        }
        assert_eq!(t.cell_at(Pos2::new(10.0, 175.0)), None);
        assert_eq!(t.cell_at(Pos2::new(350.0, 340.0)), None);
    }

    #[test]
    fn test_degenerate_screen() {
        let t = BoardTransform::new_letterboxed(Rect::from_min_max(Pos2::ZERO, Pos2::ZERO));
        assert_eq!(t.cell_at(Pos2::ZERO), None);
    }
}
