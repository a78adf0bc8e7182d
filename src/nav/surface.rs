use slotmap::new_key_type;

new_key_type! {
    /// Handle to a table owned by the document model.
    pub struct GridId;
}

/// A row, addressed by its owning grid and its zero-based index in that grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub grid: GridId,
    pub index: usize,
}

impl RowRef {
    pub fn new(grid: GridId, index: usize) -> Self {
        Self { grid, index }
    }

    pub fn cell(self, index: usize) -> CellRef {
        CellRef { row: self, index }
    }
}

/// A cell, addressed by its owning row and its zero-based index in that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: RowRef,
    pub index: usize,
}

impl CellRef {
    pub fn grid(self) -> GridId {
        self.row.grid
    }
}

/// Anything a marker or attribute can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Grid(GridId),
    Row(RowRef),
    Cell(CellRef),
}

impl Target {
    pub fn grid(self) -> GridId {
        match self {
            Target::Grid(grid) => grid,
            Target::Row(row) => row.grid,
            Target::Cell(cell) => cell.grid(),
        }
    }
}

impl From<GridId> for Target {
    fn from(grid: GridId) -> Self {
        Target::Grid(grid)
    }
}

impl From<RowRef> for Target {
    fn from(row: RowRef) -> Self {
        Target::Row(row)
    }
}

impl From<CellRef> for Target {
    fn from(cell: CellRef) -> Self {
        Target::Cell(cell)
    }
}

/// Table structure as seen by the navigator.
///
/// Unknown grids and rows report a count of zero rather than failing.
pub trait GridModel {
    fn row_count(&self, grid: GridId) -> usize;
    fn cell_count(&self, row: RowRef) -> usize;
    fn is_navigable(&self, grid: GridId) -> bool;
    fn set_navigable(&mut self, grid: GridId, navigable: bool);
}

/// Named markers and attributes on tables, rows and cells.
pub trait Presentation {
    fn apply_marker(&mut self, target: Target, marker: &str);
    fn remove_marker(&mut self, target: Target, marker: &str);
    fn has_marker(&self, target: Target, marker: &str) -> bool;
    fn attribute(&self, target: Target, name: &str) -> Option<&str>;
}

/// Everything a [`Navigator`](super::Navigator) needs from its host.
pub trait Surface: GridModel + Presentation {}

impl<T: GridModel + Presentation + ?Sized> Surface for T {}
