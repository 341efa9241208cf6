// Board geometry: cell numbering, cell decorations and the pixel offset table used to place
// markers. None of this affects movement: the server decides where a token ends up, the client
// only draws it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};


pub const NUM_ROWS: u32 = 4;
pub const NUM_COLS: u32 = 7;
pub const NUM_CELLS: u32 = NUM_ROWS * NUM_COLS;

// Markers are inset from the cell corner so that they don't cover the cell number.
pub const MARKER_INSET: i32 = 5;

// Cell 0 is not drawn: it's the off-board slot where tokens wait before their first roll.
pub const START_CELL: CellIndex = CellIndex(0);

const SNAKE_CELLS: [u32; 4] = [15, 23, 17, 9];
const LADDER_CELLS: [u32; 4] = [16, 18, 8, 3];

const DEFAULT_CELL_OFFSETS: [(i32, i32); NUM_CELLS as usize + 1] = [
    (-10, 110),
    (0, 90),
    (30, 90),
    (60, 90),
    (90, 90),
    (120, 90),
    (150, 90),
    (180, 90),
    (180, 60),
    (150, 60),
    (120, 60),
    (90, 60),
    (60, 60),
    (30, 60),
    (0, 60),
    (0, 30),
    (30, 30),
    (60, 30),
    (90, 30),
    (120, 30),
    (150, 30),
    (180, 30),
    (180, 0),
    (150, 0),
    (120, 0),
    (90, 0),
    (60, 0),
    (30, 0),
    (0, 0),
];


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct CellIndex(pub u32);

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CellOffset {
    pub x: i32,
    pub y: i32,
}

impl CellOffset {
    pub const fn new(x: i32, y: i32) -> Self { CellOffset { x, y } }

    pub fn inset(self, by: i32) -> Self { CellOffset::new(self.x + by, self.y + by) }

    // Value for the `transform` CSS property.
    pub fn to_css_translate(self) -> String { format!("translate({}px, {}px)", self.x, self.y) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellDecoration {
    Plain,
    Snake,
    Ladder,
}

impl CellDecoration {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            CellDecoration::Plain => None,
            CellDecoration::Snake => Some("snake"),
            CellDecoration::Ladder => Some("ladder"),
        }
    }
}


// Pixel offsets for every cell, including the start slot at index 0.
#[derive(Clone, Debug)]
pub struct CellTable {
    offsets: Vec<CellOffset>,
}

impl CellTable {
    pub fn new(offsets: Vec<CellOffset>) -> Self { CellTable { offsets } }

    pub fn len(&self) -> usize { self.offsets.len() }
    pub fn is_empty(&self) -> bool { self.offsets.is_empty() }

    pub fn offset(&self, cell: CellIndex) -> Option<CellOffset> {
        self.offsets.get(usize::try_from(cell.0).ok()?).copied()
    }

    // Where the marker for a token standing on `cell` goes, or `None` if the cell is unknown.
    pub fn marker_placement(&self, cell: CellIndex) -> Option<CellOffset> {
        self.offset(cell).map(|offset| offset.inset(MARKER_INSET))
    }
}

impl Default for CellTable {
    fn default() -> Self {
        CellTable::new(DEFAULT_CELL_OFFSETS.iter().map(|&(x, y)| CellOffset::new(x, y)).collect())
    }
}


#[derive(Clone, Debug)]
pub struct BoardLayout {
    num_rows: u32,
    num_cols: u32,
    decorations: HashMap<CellIndex, CellDecoration>,
}

impl BoardLayout {
    pub fn new() -> Self {
        let decorations = SNAKE_CELLS
            .iter()
            .map(|&c| (CellIndex(c), CellDecoration::Snake))
            .chain(LADDER_CELLS.iter().map(|&c| (CellIndex(c), CellDecoration::Ladder)))
            .collect();
        BoardLayout { num_rows: NUM_ROWS, num_cols: NUM_COLS, decorations }
    }

    pub fn with_decorations(
        mut self, decorations: impl IntoIterator<Item = (CellIndex, CellDecoration)>,
    ) -> Self {
        self.decorations = decorations.into_iter().collect();
        self
    }

    pub fn num_cells(&self) -> u32 { self.num_rows * self.num_cols }

    // Cell numbers in the order cells are appended to the board container: top row first,
    // alternating direction so that consecutive numbers stay adjacent.
    pub fn render_order(&self) -> Vec<CellIndex> {
        let mut order = Vec::with_capacity(self.num_cells() as usize);
        for row in (0..self.num_rows).rev() {
            let left_to_right = row % 2 == 0;
            for col in 0..self.num_cols {
                let number = if left_to_right {
                    row * self.num_cols + col + 1
                } else {
                    row * self.num_cols + (self.num_cols - col)
                };
                order.push(CellIndex(number));
            }
        }
        order
    }

    pub fn decoration(&self, cell: CellIndex) -> CellDecoration {
        self.decorations.get(&cell).copied().unwrap_or(CellDecoration::Plain)
    }

    // Rows as they appear on screen, top to bottom.
    pub fn display_rows(&self) -> Vec<Vec<CellIndex>> {
        self.render_order().chunks(self.num_cols as usize).map(|row| row.to_vec()).collect()
    }
}
