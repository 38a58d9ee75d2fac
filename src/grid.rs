//! Uniform 2D cell surface shared by the board, piece shapes, and read-only
//! windows onto either.

// ============================================================================
// Cells and coordinates
// ============================================================================

/// Contents of one grid cell: which tetromino filled it, or nothing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cell {
    I,
    J,
    L,
    O,
    S,
    Z,
    T,
    Empty,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Number of distinct tetromino cell variants (excludes `Empty`).
pub const NUM_TETROMINOES: usize = 7;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// CellGrid capability trait
// ============================================================================

/// Anything addressable as a rectangle of cells.
///
/// `get`/`set` treat out-of-bounds coordinates as a programming error and
/// panic; callers stay inside `size()`. `can_place`/`place` are overlay
/// operations shared by every implementor.
pub trait CellGrid {
    fn get(&self, pos: Pos) -> Cell;
    fn set(&mut self, pos: Pos, cell: Cell);
    fn size(&self) -> Size;

    /// True iff `tile` overlaid at `pos` stays in bounds and every non-empty
    /// tile cell lands on an empty cell of `self`.
    fn can_place(&self, pos: Pos, tile: &dyn CellGrid) -> bool {
        let tile_size = tile.size();
        let this_size = self.size();
        if pos.x + tile_size.width > this_size.width {
            return false;
        }
        if pos.y + tile_size.height > this_size.height {
            return false;
        }
        for y in 0..tile_size.height {
            for x in 0..tile_size.width {
                if !tile.get(Pos::new(x, y)).is_empty()
                    && !self.get(Pos::new(pos.x + x, pos.y + y)).is_empty()
                {
                    return false;
                }
            }
        }
        true
    }

    /// Copies every non-empty cell of `tile` onto `self` at `pos`. Empty tile
    /// cells leave the underlying cell untouched. The caller must have
    /// validated `can_place` first.
    fn place(&mut self, pos: Pos, tile: &dyn CellGrid) {
        let tile_size = tile.size();
        for y in 0..tile_size.height {
            for x in 0..tile_size.width {
                let cell = tile.get(Pos::new(x, y));
                if !cell.is_empty() {
                    self.set(Pos::new(pos.x + x, pos.y + y), cell);
                }
            }
        }
    }
}

// ============================================================================
// Owning fixed-size grid
// ============================================================================

/// Fixed `W`×`H` grid that owns its cell storage. Backs both the board and
/// the canonical 4×4 piece shapes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StaticGrid<const W: usize, const H: usize> {
    cells: [[Cell; W]; H],
}

impl<const W: usize, const H: usize> StaticGrid<W, H> {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; W]; H],
        }
    }

    /// Builds a grid from a row-major shape literal. Rows beyond the literal
    /// stay empty; a literal wider or taller than the grid is a fatal
    /// construction error.
    pub fn from_rows(rows: &[&[Cell]]) -> Self {
        if rows.len() > H {
            panic!("shape literal has {} rows, grid holds {}", rows.len(), H);
        }
        let mut grid = Self::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() > W {
                panic!("shape literal row is {} wide, grid holds {}", row.len(), W);
            }
            for (x, &cell) in row.iter().enumerate() {
                grid.cells[y][x] = cell;
            }
        }
        grid
    }

    pub fn row(&self, y: usize) -> &[Cell; W] {
        &self.cells[y]
    }

    /// Removes `row` by shifting every row above it down by one and inserting
    /// an empty row at the top. Backward copy: only rows 0..=row change.
    pub fn collapse_row(&mut self, row: usize) {
        for y in (1..=row).rev() {
            self.cells[y] = self.cells[y - 1];
        }
        self.cells[0] = [Cell::Empty; W];
    }
}

impl<const W: usize, const H: usize> Default for StaticGrid<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> CellGrid for StaticGrid<W, H> {
    fn get(&self, pos: Pos) -> Cell {
        self.cells[pos.y][pos.x]
    }

    fn set(&mut self, pos: Pos, cell: Cell) {
        self.cells[pos.y][pos.x] = cell;
    }

    fn size(&self) -> Size {
        Size::new(W, H)
    }
}

// ============================================================================
// Read-only window
// ============================================================================

/// Non-owning rectangular window onto another grid, addressed relative to
/// `top_left`. Read-only: mutation through a view is an invariant violation.
pub struct GridView<'a> {
    inner: &'a dyn CellGrid,
    top_left: Pos,
    bottom_right: Pos,
}

impl<'a> GridView<'a> {
    pub fn new(inner: &'a dyn CellGrid, top_left: Pos, bottom_right: Pos) -> Self {
        Self {
            inner,
            top_left,
            bottom_right,
        }
    }
}

impl CellGrid for GridView<'_> {
    fn get(&self, pos: Pos) -> Cell {
        self.inner
            .get(Pos::new(self.top_left.x + pos.x, self.top_left.y + pos.y))
    }

    fn set(&mut self, _pos: Pos, _cell: Cell) {
        panic!("cannot mutate a grid through a GridView");
    }

    fn size(&self) -> Size {
        Size::new(
            self.bottom_right.x - self.top_left.x,
            self.bottom_right.y - self.top_left.y,
        )
    }
}
