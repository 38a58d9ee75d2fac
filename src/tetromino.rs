//! Tetromino model: canonical shapes, the rotation state machine, and
//! wall-kick resolution.
//!
//! Rotation is a view transform, never a cell copy: a piece stores only its
//! unrotated shape and maps coordinates through the inverse rotation on every
//! read. Repeated rotations therefore cannot drift the stored cells.

use std::sync::OnceLock;

use crate::grid::{Cell, CellGrid, Pos, Size, StaticGrid, NUM_TETROMINOES};

// ============================================================================
// Rotation states and point transforms
// ============================================================================

/// One of the four discrete rotation states, cyclic.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Next state counter-clockwise.
    pub fn ccw(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// Next state clockwise.
    pub fn cw(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R270,
            Rotation::R90 => Rotation::R0,
            Rotation::R180 => Rotation::R90,
            Rotation::R270 => Rotation::R180,
        }
    }
}

/// Maps a point of the unrotated `size` rectangle to where it lands after
/// rotating by `rot`.
pub fn rotate_point(rot: Rotation, p: Pos, size: Size) -> Pos {
    match rot {
        Rotation::R0 => p,
        Rotation::R90 => Pos::new(p.y, size.width - 1 - p.x),
        Rotation::R180 => Pos::new(size.width - 1 - p.x, size.height - 1 - p.y),
        Rotation::R270 => Pos::new(size.height - 1 - p.y, p.x),
    }
}

/// Inverse of [`rotate_point`]: maps a point of the rotated rectangle back
/// into the unrotated `size` rectangle.
pub fn unrotate_point(rot: Rotation, p: Pos, size: Size) -> Pos {
    match rot {
        Rotation::R0 => p,
        Rotation::R90 => Pos::new(size.width - 1 - p.y, p.x),
        Rotation::R180 => Pos::new(size.width - 1 - p.x, size.height - 1 - p.y),
        Rotation::R270 => Pos::new(p.y, size.height - 1 - p.x),
    }
}

// ============================================================================
// Tetromino
// ============================================================================

/// Horizontal wall-kick offsets, tried in order. No vertical kicks.
const WALL_KICKS: [i64; 3] = [0, 1, -1];

/// A piece: canonical cells plus current rotation state. Reads go through the
/// inverse rotation transform, so `size()` swaps axes at 90°/270° and the
/// stored cells never change after construction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tetromino {
    grid: StaticGrid<4, 4>,
    unrot_size: Size,
    pivot: Pos,
    rot: Rotation,
    rotates: bool,
}

impl Tetromino {
    /// Builds a piece from a shape literal. A literal exceeding the 4×4
    /// storage is a fatal construction error. The piece does not rotate until
    /// a pivot is set.
    pub fn new(rows: &[&[Cell]]) -> Self {
        let grid = StaticGrid::from_rows(rows);
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        Self {
            grid,
            unrot_size: Size::new(width, rows.len()),
            pivot: Pos::new(0, 0),
            rot: Rotation::R0,
            rotates: false,
        }
    }

    /// Marks the rotation pivot and enables rotation. The pivot is a cell of
    /// the unrotated shape that stays fixed in board space across rotations.
    pub fn set_pivot(&mut self, pivot: Pos) {
        self.pivot = pivot;
        self.rotates = true;
    }

    pub fn rotation(&self) -> Rotation {
        self.rot
    }

    pub fn rotates(&self) -> bool {
        self.rotates
    }

    /// Which tetromino this is, read off the first filled cell.
    pub fn kind(&self) -> Cell {
        for y in 0..self.unrot_size.height {
            for x in 0..self.unrot_size.width {
                let cell = self.grid.get(Pos::new(x, y));
                if !cell.is_empty() {
                    return cell;
                }
            }
        }
        Cell::Empty
    }

    /// Attempts the next counter-clockwise rotation state against `grid`,
    /// updating `pos` so the pivot stays fixed, with wall-kick resolution.
    pub fn rotate_ccw(&mut self, grid: &dyn CellGrid, pos: &mut Pos) {
        self.rotate_to(grid, pos, self.rot.ccw());
    }

    /// Clockwise counterpart of [`Tetromino::rotate_ccw`].
    pub fn rotate_cw(&mut self, grid: &dyn CellGrid, pos: &mut Pos) {
        self.rotate_to(grid, pos, self.rot.cw());
    }

    /// Core rotation protocol: for each kick offset, compute the position
    /// that keeps the pivot fixed in board space and commit the first
    /// candidate with non-negative coordinates that `grid` accepts. All-fail
    /// leaves rotation and position unchanged. Non-rotating pieces ignore
    /// every request.
    fn rotate_to(&mut self, grid: &dyn CellGrid, pos: &mut Pos, new_rot: Rotation) {
        if !self.rotates {
            return;
        }
        let old_rot = self.rot;
        for kick in WALL_KICKS {
            let pivot_pre = rotate_point(old_rot, self.pivot, self.unrot_size);
            self.rot = new_rot;
            let pivot_post = rotate_point(new_rot, self.pivot, self.unrot_size);
            let new_x = pos.x as i64 + pivot_pre.x as i64 - pivot_post.x as i64 + kick;
            let new_y = pos.y as i64 + pivot_pre.y as i64 - pivot_post.y as i64;
            if new_x < 0 || new_y < 0 {
                self.rot = old_rot;
                continue;
            }
            let candidate = Pos::new(new_x as usize, new_y as usize);
            if !grid.can_place(candidate, &*self) {
                self.rot = old_rot;
                continue;
            }
            *pos = candidate;
            return;
        }
    }
}

impl CellGrid for Tetromino {
    fn get(&self, pos: Pos) -> Cell {
        self.grid.get(unrotate_point(self.rot, pos, self.unrot_size))
    }

    fn set(&mut self, pos: Pos, cell: Cell) {
        self.grid
            .set(unrotate_point(self.rot, pos, self.unrot_size), cell);
    }

    fn size(&self) -> Size {
        match self.rot {
            Rotation::R0 | Rotation::R180 => self.unrot_size,
            Rotation::R90 | Rotation::R270 => {
                Size::new(self.unrot_size.height, self.unrot_size.width)
            }
        }
    }
}

// ============================================================================
// Canonical shape table
// ============================================================================

static TETROMINOES: OnceLock<[Tetromino; NUM_TETROMINOES]> = OnceLock::new();

/// The seven canonical shapes, indexed by `Cell` discriminant, built once and
/// immutable afterwards.
pub fn tetrominoes() -> &'static [Tetromino; NUM_TETROMINOES] {
    TETROMINOES.get_or_init(make_tetromino_table)
}

/// A fresh instance of the canonical shape for `kind`.
pub fn tetromino(kind: Cell) -> Tetromino {
    assert!(!kind.is_empty(), "the empty cell has no shape");
    tetrominoes()[kind as usize].clone()
}

fn make_tetromino_table() -> [Tetromino; NUM_TETROMINOES] {
    use Cell::{Empty as N, I, J, L, O, S, T, Z};

    let mut i = Tetromino::new(&[&[I, I, I, I]]);
    i.set_pivot(Pos::new(1, 0));

    let mut j = Tetromino::new(&[&[J, N, N], &[J, J, J]]);
    j.set_pivot(Pos::new(1, 1));

    let mut l = Tetromino::new(&[&[N, N, L], &[L, L, L]]);
    l.set_pivot(Pos::new(1, 1));

    // The square never rotates; no pivot.
    let o = Tetromino::new(&[&[O, O], &[O, O]]);

    let mut s = Tetromino::new(&[&[N, S, S], &[S, S, N]]);
    s.set_pivot(Pos::new(1, 1));

    let mut z = Tetromino::new(&[&[Z, Z, N], &[N, Z, Z]]);
    z.set_pivot(Pos::new(1, 1));

    let mut t = Tetromino::new(&[&[N, T, N], &[T, T, T]]);
    t.set_pivot(Pos::new(1, 1));

    [i, j, l, o, s, z, t]
}
