//! Pieces module - shape table and pivot rotation
//!
//! Offsets are `(x, y)` with y growing downward. Shapes spawn in the top row,
//! shifted right by [`SPAWN_X_OFFSET`]; the Line spawns upright.

use crate::types::{PieceKind, SPAWN_X_OFFSET};

/// Offset (or absolute position) of a single cell
pub type CellPos = (i8, i8);

/// The four cells of a piece
pub type PieceCells = [CellPos; 4];

/// Get the spawn-relative cells for a piece kind
pub fn get_shape(kind: PieceKind) -> PieceCells {
    match kind {
        PieceKind::Square => [(0, 0), (0, 1), (1, 0), (1, 1)],
        PieceKind::Line => [(0, 0), (0, 1), (0, 2), (0, 3)],
        PieceKind::T => [(0, 0), (0, 1), (0, 2), (1, 1)],
        PieceKind::S => [(0, 0), (0, 1), (1, 1), (1, 2)],
        PieceKind::L => [(0, 0), (0, 1), (0, 2), (1, 2)],
        PieceKind::J => [(1, 0), (1, 1), (1, 2), (0, 2)],
    }
}

/// Absolute cells for a newly spawned piece
pub fn get_spawn_cells(kind: PieceKind) -> PieceCells {
    translate(&get_shape(kind), SPAWN_X_OFFSET, 0)
}

/// Shift every cell by (dx, dy)
pub fn translate(cells: &PieceCells, dx: i8, dy: i8) -> PieceCells {
    cells.map(|(x, y)| (x + dx, y + dy))
}

/// Rotate 90° clockwise around the bounding-box minimum.
///
/// `new_x = min_x - (y - min_y) + 1`, `new_y = min_y + (x - min_x)`.
/// The result is not collision-checked.
pub fn rotate_cw(cells: &PieceCells) -> PieceCells {
    let min_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = cells.iter().map(|&(_, y)| y).min().unwrap_or(0);

    cells.map(|(x, y)| (min_x - (y - min_y) + 1, min_y + (x - min_x)))
}

/// Cells shifted so the bounding box starts at (0, 0), sorted.
///
/// Two placements with equal normalized cells have the same occupancy shape.
pub fn normalized(cells: &PieceCells) -> PieceCells {
    let min_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = cells.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let mut out = translate(cells, -min_x, -min_y);
    out.sort_unstable();
    out
}
