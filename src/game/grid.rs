//! Grid, cells and directions.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::game::{PlayerId, UnitId};

/// A position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    /// Row, growing southwards.
    pub row: u16,
    /// Column, growing eastwards.
    pub col: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// The neighbouring coordinate in a direction.
    ///
    /// Returns `None` for [`Direction::None`] and when stepping off the
    /// top or left edge. Stepping off the bottom or right edge is caught by
    /// [`Grid::in_bounds`].
    #[must_use]
    pub fn step(self, dir: Direction) -> Option<Coord> {
        match dir {
            Direction::North => self.row.checked_sub(1).map(|row| Coord::new(row, self.col)),
            Direction::South => self.row.checked_add(1).map(|row| Coord::new(row, self.col)),
            Direction::West => self.col.checked_sub(1).map(|col| Coord::new(self.row, col)),
            Direction::East => self.col.checked_add(1).map(|col| Coord::new(self.row, col)),
            Direction::None => None,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction of a move or attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// One row up.
    North,
    /// One row down.
    South,
    /// One column right.
    East,
    /// One column left.
    West,
    /// Stay put.
    None,
}

impl Direction {
    /// Every direction, `None` last.
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::None,
    ];

    /// Parse the glyph used in order files.
    #[must_use]
    pub const fn from_glyph(c: char) -> Option<Self> {
        match c {
            'n' => Some(Direction::North),
            's' => Some(Direction::South),
            'e' => Some(Direction::East),
            'w' => Some(Direction::West),
            '.' => Some(Direction::None),
            _ => None,
        }
    }

    /// Glyph used in order files.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::South => 's',
            Direction::East => 'e',
            Direction::West => 'w',
            Direction::None => '.',
        }
    }
}

/// Terrain of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Terrain {
    /// Walkable ground.
    #[default]
    Empty,
    /// Impassable, never owned, never occupied.
    Wall,
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Cell {
    /// Terrain kind.
    pub terrain: Terrain,
    /// Player whose territory this is.
    pub owner: Option<PlayerId>,
    /// Unit standing here.
    pub unit: Option<UnitId>,
}

impl Cell {
    /// An empty, unowned cell.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            terrain: Terrain::Empty,
            owner: None,
            unit: None,
        }
    }

    /// A wall cell.
    #[must_use]
    pub const fn wall() -> Self {
        Self {
            terrain: Terrain::Wall,
            owner: None,
            unit: None,
        }
    }

    /// Whether a unit could be placed here right now.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self.terrain, Terrain::Empty) && self.unit.is_none()
    }
}

/// Rectangular grid of cells stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    rows: u16,
    cols: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of empty cells.
    ///
    /// Returns `None` if either dimension is zero.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        let size = usize::from(rows) * usize::from(cols);
        Some(Self {
            rows,
            cols,
            cells: vec![Cell::empty(); size],
        })
    }

    /// Create a grid of empty cells surrounded by a ring of walls.
    ///
    /// Returns `None` if either dimension is zero.
    #[must_use]
    pub fn walled(rows: u16, cols: u16) -> Option<Self> {
        let mut grid = Self::new(rows, cols)?;
        for (idx, cell) in grid.cells.iter_mut().enumerate() {
            let row = idx / usize::from(cols);
            let col = idx % usize::from(cols);
            if row == 0 || col == 0 || row + 1 == usize::from(rows) || col + 1 == usize::from(cols) {
                *cell = Cell::wall();
            }
        }
        Some(grid)
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Check whether a coordinate lies on the grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| usize::from(coord.row) * usize::from(self.cols) + usize::from(coord.col))
    }

    /// Cell at a coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|idx| &self.cells[idx])
    }

    /// Mutable cell at a coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.index(coord).map(|idx| &mut self.cells[idx])
    }

    /// Replace the cell at a coordinate. Returns `false` if out of bounds.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Iterate over all cells with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let cols = usize::from(self.cols);
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx / cols) as u16, (idx % cols) as u16);
            (coord, cell)
        })
    }

    /// Iterate over rows of cells.
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(usize::from(self.cols))
    }

    /// Count the cells owned by each of `players` players.
    ///
    /// Owners outside `0..players` are ignored.
    #[must_use]
    pub fn territory(&self, players: usize) -> Vec<u32> {
        let mut counts = vec![0u32; players];
        for cell in &self.cells {
            if let Some(count) = cell.owner.and_then(|o| counts.get_mut(usize::from(o))) {
                *count += 1;
            }
        }
        counts
    }

    /// Clear every occupant. Terrain and ownership are kept.
    pub fn clear_units(&mut self) {
        for cell in &mut self.cells {
            cell.unit = None;
        }
    }
}

/// Rectangular spawn region assigned to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadrant {
    /// Rows, inclusive.
    pub rows: RangeInclusive<u16>,
    /// Columns, inclusive.
    pub cols: RangeInclusive<u16>,
}

impl Quadrant {
    /// Spawn quadrant of a player on a `rows`×`cols` board.
    ///
    /// Player 0 is top-left, 1 bottom-right, 2 top-right and 3 bottom-left.
    /// The outer ring of the board belongs to no quadrant. Returns `None`
    /// for players beyond the fourth or boards smaller than 4×4.
    ///
    /// Bottom and right halves start at `rows/2` and `cols/2` and run up to
    /// the ring inclusively, so even a 4×4 board has a one-cell quadrant
    /// for every player.
    #[must_use]
    pub fn for_player(player: PlayerId, rows: u16, cols: u16) -> Option<Self> {
        if rows < 4 || cols < 4 {
            return None;
        }
        let top = 1..=rows / 2 - 1;
        let bottom = rows / 2..=rows - 2;
        let left = 1..=cols / 2 - 1;
        let right = cols / 2..=cols - 2;

        let (rows, cols) = match player {
            0 => (top, left),
            1 => (bottom, right),
            2 => (top, right),
            3 => (bottom, left),
            _ => return None,
        };
        Some(Self { rows, cols })
    }

    /// Whether a coordinate lies inside the quadrant.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.rows.contains(&coord.row) && self.cols.contains(&coord.col)
    }

    /// Number of cells in the quadrant.
    #[must_use]
    pub fn area(&self) -> usize {
        let height = usize::from(*self.rows.end() - *self.rows.start()) + 1;
        let width = usize::from(*self.cols.end() - *self.cols.start()) + 1;
        height * width
    }

    /// All coordinates, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.rows
            .clone()
            .flat_map(move |row| self.cols.clone().map(move |col| Coord::new(row, col)))
    }
}


/// Kani proofs for spawn quadrant geometry.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Quadrants stay inside the board and off its outer ring.
    #[kani::proof]
    fn prove_quadrant_inside_ring() {
        let rows: u16 = kani::any();
        let cols: u16 = kani::any();
        let player: u8 = kani::any();
        let row: u16 = kani::any();
        let col: u16 = kani::any();

        if let Some(quadrant) = Quadrant::for_player(player, rows, cols) {
            if quadrant.contains(Coord::new(row, col)) {
                assert!(row >= 1 && row + 2 <= rows);
                assert!(col >= 1 && col + 2 <= cols);
            }
        }
    }

    /// No cell belongs to two players' quadrants.
    #[kani::proof]
    fn prove_quadrants_disjoint() {
        let rows: u16 = kani::any();
        let cols: u16 = kani::any();
        let a: u8 = kani::any();
        let b: u8 = kani::any();
        let coord = Coord::new(kani::any(), kani::any());
        kani::assume(a != b);

        if let (Some(qa), Some(qb)) = (
            Quadrant::for_player(a, rows, cols),
            Quadrant::for_player(b, rows, cols),
        ) {
            assert!(!(qa.contains(coord) && qb.contains(coord)));
        }
    }
}
