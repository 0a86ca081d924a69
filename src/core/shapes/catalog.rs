//=========================================================================
// Shape Catalog
//=========================================================================
//
// Static table of tetromino rotation states.
//
// Architecture:
//   TetrominoType ──shapes_for()──> &'static [Shape] (1, 2 or 4 entries)
//
// Every shape is a rectangular matrix of color ids: 0 = empty cell,
// 1..=7 = filled cell carrying the tetromino's color id. All rotations of
// a type hold the same number of filled cells; the table is authored that
// way and is not cross-checked at runtime.
//
//=========================================================================

//=== TetrominoType =======================================================

/// The seven fixed tetromino variants.
///
/// The declaration order defines the type index (`O` = 0 .. `Z` = 6) and the
/// color id (`index + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    O,
    I,
    T,
    J,
    L,
    S,
    Z,
}

impl TetrominoType {
    /// Number of tetromino variants.
    pub const COUNT: usize = 7;

    /// All variants in type-index order.
    pub const ALL: [TetrominoType; Self::COUNT] = [
        TetrominoType::O,
        TetrominoType::I,
        TetrominoType::T,
        TetrominoType::J,
        TetrominoType::L,
        TetrominoType::S,
        TetrominoType::Z,
    ];

    /// Returns the type index in `0..7`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a variant by type index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Color id written into every filled cell of this type's shapes.
    pub fn color_id(self) -> u8 {
        self as u8 + 1
    }

    /// Rotation states for this type (see [`ShapeCatalog::shapes_for`]).
    pub fn shapes(self) -> &'static [Shape] {
        ShapeCatalog::shapes_for(self)
    }

    /// Number of distinct rotation states for this type.
    pub fn rotation_count(self) -> usize {
        ShapeCatalog::rotation_count(self)
    }
}

//=== Shape ===============================================================

/// An immutable rotation state: a rectangular matrix of color ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    rows: &'static [&'static [u8]],
}

impl Shape {
    const fn new(rows: &'static [&'static [u8]]) -> Self {
        Self { rows }
    }

    /// Row-major view of the matrix.
    pub fn rows(&self) -> &'static [&'static [u8]] {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Color id at `(x, y)`, or `None` outside the matrix.
    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Iterates the filled cells as `(x, y, color_id)`.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + 'static {
        let rows = self.rows;
        rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &value)| value != 0)
                .map(move |(x, &value)| (x, y, value))
        })
    }

    /// Number of filled cells.
    pub fn cell_count(&self) -> usize {
        self.filled_cells().count()
    }
}

//=== Rotation Tables =====================================================

const O_SHAPES: &[Shape] = &[Shape::new(&[
    &[1, 1],
    &[1, 1],
])];

const I_SHAPES: &[Shape] = &[
    Shape::new(&[
        &[0, 0, 0, 0],
        &[2, 2, 2, 2],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
    ]),
    Shape::new(&[
        &[0, 0, 2, 0],
        &[0, 0, 2, 0],
        &[0, 0, 2, 0],
        &[0, 0, 2, 0],
    ]),
];

const T_SHAPES: &[Shape] = &[
    Shape::new(&[
        &[0, 3, 0],
        &[3, 3, 3],
        &[0, 0, 0],
    ]),
    Shape::new(&[
        &[0, 3, 0],
        &[0, 3, 3],
        &[0, 3, 0],
    ]),
    Shape::new(&[
        &[0, 0, 0],
        &[3, 3, 3],
        &[0, 3, 0],
    ]),
    Shape::new(&[
        &[0, 3, 0],
        &[3, 3, 0],
        &[0, 3, 0],
    ]),
];

const J_SHAPES: &[Shape] = &[
    Shape::new(&[
        &[4, 0, 0],
        &[4, 4, 4],
        &[0, 0, 0],
    ]),
    Shape::new(&[
        &[0, 4, 4],
        &[0, 4, 0],
        &[0, 4, 0],
    ]),
    Shape::new(&[
        &[0, 0, 0],
        &[4, 4, 4],
        &[0, 0, 4],
    ]),
    Shape::new(&[
        &[0, 4, 0],
        &[0, 4, 0],
        &[4, 4, 0],
    ]),
];

const L_SHAPES: &[Shape] = &[
    Shape::new(&[
        &[0, 0, 5],
        &[5, 5, 5],
        &[0, 0, 0],
    ]),
    Shape::new(&[
        &[0, 5, 0],
        &[0, 5, 0],
        &[0, 5, 5],
    ]),
    Shape::new(&[
        &[0, 0, 0],
        &[5, 5, 5],
        &[5, 0, 0],
    ]),
    Shape::new(&[
        &[5, 5, 0],
        &[0, 5, 0],
        &[0, 5, 0],
    ]),
];

const S_SHAPES: &[Shape] = &[
    Shape::new(&[
        &[0, 6, 6],
        &[6, 6, 0],
        &[0, 0, 0],
    ]),
    Shape::new(&[
        &[0, 6, 0],
        &[0, 6, 6],
        &[0, 0, 6],
    ]),
];

const Z_SHAPES: &[Shape] = &[
    Shape::new(&[
        &[7, 7, 0],
        &[0, 7, 7],
        &[0, 0, 0],
    ]),
    Shape::new(&[
        &[0, 0, 7],
        &[0, 7, 7],
        &[0, 7, 0],
    ]),
];

//=== ShapeCatalog ========================================================

/// Read-only lookup over the rotation tables.
pub struct ShapeCatalog;

impl ShapeCatalog {
    /// Returns the ordered rotation states for `kind`.
    pub fn shapes_for(kind: TetrominoType) -> &'static [Shape] {
        match kind {
            TetrominoType::O => O_SHAPES,
            TetrominoType::I => I_SHAPES,
            TetrominoType::T => T_SHAPES,
            TetrominoType::J => J_SHAPES,
            TetrominoType::L => L_SHAPES,
            TetrominoType::S => S_SHAPES,
            TetrominoType::Z => Z_SHAPES,
        }
    }

    /// Returns how many rotation states `kind` has (1, 2 or 4).
    pub fn rotation_count(kind: TetrominoType) -> usize {
        Self::shapes_for(kind).len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
