//! Selection and movement state over navigable tables.
//!
//! A [`Navigator`] tracks one selected table, row and cell and keeps the
//! matching markers on the host [`Surface`] in step with them. The surface is
//! borrowed for every call; the navigator only holds handles into it.

pub mod options;
pub mod search;
pub mod surface;


pub use options::NavOptions;
pub use search::PROBE_LIMIT;
pub use surface::{CellRef, GridId, GridModel, Presentation, RowRef, Surface, Target};

use search::{Step, boundary_wrap_search};

/// Result of selecting a specific row or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Changed,
    Unchanged,
}

/// Result of a directional move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Moved,
    /// The search settled on the element that was already selected.
    Unchanged,
    /// Nothing selectable was found within the probe limit.
    Failed,
}

#[derive(Debug, Default)]
pub struct Navigator {
    options: NavOptions,
    grids: Vec<GridId>,
    active: bool,
    selected_table: Option<GridId>,
    selected_row: Option<RowRef>,
    selected_cell: Option<CellRef>,
    // Last holders of the row/cell markers. Only used to take the marker off
    // again; never consulted for movement.
    previous_row: Option<RowRef>,
    previous_cell: Option<CellRef>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &NavOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn selected_table(&self) -> Option<GridId> {
        self.selected_table
    }

    pub fn selected_row(&self) -> Option<RowRef> {
        self.selected_row
    }

    pub fn selected_cell(&self) -> Option<CellRef> {
        self.selected_cell
    }

    /// Start a session over `grids`, selecting the first selectable row and
    /// cell of the first grid.
    ///
    /// Any earlier session is replaced without removing its markers; call
    /// [`Navigator::reset`] first to clean up.
    pub fn init_session<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        grids: &[GridId],
        options: NavOptions,
    ) {
        *self = Self {
            options,
            grids: grids.to_vec(),
            active: true,
            ..Self::default()
        };

        for &grid in grids {
            surface.set_navigable(grid, true);
            surface.apply_marker(grid.into(), &self.options.navigable_marker);
        }

        let Some(&first) = grids.first() else {
            tracing::debug!("navigation session started without grids");
            return;
        };

        self.select_table(surface, first);
        let outcome = self.move_to_row(surface, 0);
        tracing::debug!(
            grids = grids.len(),
            ?outcome,
            row = ?self.selected_row,
            cell = ?self.selected_cell,
            "navigation session started"
        );
    }

    pub fn select_table<S: Surface + ?Sized>(&mut self, surface: &mut S, grid: GridId) -> bool {
        if !surface.is_navigable(grid) {
            tracing::debug!(?grid, "refusing to select non-navigable table");
            return false;
        }

        if self.selected_table == Some(grid) {
            return true;
        }

        if let Some(previous) = self.selected_table {
            surface.remove_marker(previous.into(), &self.options.selected_table_marker);
        }

        self.selected_table = Some(grid);
        surface.apply_marker(grid.into(), &self.options.selected_table_marker);
        true
    }

    /// Select `row` without checking whether it is selectable.
    pub fn select_row<S: Surface + ?Sized>(&mut self, surface: &mut S, row: RowRef) -> Selection {
        if self.selected_row == Some(row) {
            return Selection::Unchanged;
        }

        self.previous_row = self.selected_row;
        if let Some(previous) = self.previous_row {
            surface.remove_marker(previous.into(), &self.options.selected_row_marker);
        }

        self.selected_row = Some(row);
        surface.apply_marker(row.into(), &self.options.selected_row_marker);
        tracing::trace!(grid = ?row.grid, row = row.index, "row selected");
        Selection::Changed
    }

    /// Select `cell`, switching the selected table first when the cell lives
    /// in another one.
    pub fn select_cell<S: Surface + ?Sized>(&mut self, surface: &mut S, cell: CellRef) -> Selection {
        if self.selected_cell == Some(cell) {
            return Selection::Unchanged;
        }

        if self.selected_table != Some(cell.grid()) && !self.select_table(surface, cell.grid()) {
            tracing::warn!(grid = ?cell.grid(), "cell selected outside any navigable table");
        }

        self.previous_cell = self.selected_cell;
        if let Some(previous) = self.previous_cell {
            surface.remove_marker(previous.into(), &self.options.selected_cell_marker);
        }

        self.selected_cell = Some(cell);
        surface.apply_marker(cell.into(), &self.options.selected_cell_marker);
        tracing::trace!(
            grid = ?cell.grid(),
            row = cell.row.index,
            cell = cell.index,
            "cell selected"
        );
        Selection::Changed
    }

    /// Select cell `x` of row `y` in the selected table. Never searches for
    /// an alternative: returns false and changes nothing when the target is
    /// out of range or not selectable.
    pub fn select_by_coordinates<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        x: usize,
        y: usize,
    ) -> bool {
        let Some(grid) = self.selected_table else {
            return false;
        };

        if y >= surface.row_count(grid) {
            return false;
        }
        let row = RowRef::new(grid, y);

        if x >= surface.cell_count(row) {
            return false;
        }
        let cell = row.cell(x);

        if !self.is_selectable(surface, row.into()) || !self.is_selectable(surface, cell.into()) {
            return false;
        }

        self.select_row(surface, row);
        self.select_cell(surface, cell);
        true
    }

    pub fn move_to_row<S: Surface + ?Sized>(&mut self, surface: &mut S, delta: isize) -> Movement {
        let Some(grid) = self.selected_table else {
            return Movement::Failed;
        };

        let anchor = self
            .selected_row
            .filter(|row| row.grid == grid)
            .map(|row| row.index);
        let view: &S = surface;
        let found =
            boundary_wrap_search(view.row_count(grid), anchor, delta, Step::Forward, |index| {
                self.is_selectable(view, RowRef::new(grid, index).into())
            });

        let Some(index) = found else {
            tracing::debug!(?grid, delta, "no selectable row within probe limit");
            return Movement::Failed;
        };

        let row = RowRef::new(grid, index);
        if self.select_row(surface, row) == Selection::Unchanged {
            return Movement::Unchanged;
        }

        let cell = self.move_to_cell(surface, 0);
        tracing::debug!(row = index, ?cell, "moved to row");
        Movement::Moved
    }

    pub fn move_to_cell<S: Surface + ?Sized>(&mut self, surface: &mut S, delta: isize) -> Movement {
        let Some(row) = self.selected_row else {
            return Movement::Failed;
        };

        // A selected cell left over from another row is not a position here.
        let anchor = self
            .selected_cell
            .filter(|cell| cell.row == row)
            .map(|cell| cell.index);
        let view: &S = surface;
        let found =
            boundary_wrap_search(view.cell_count(row), anchor, delta, Step::Backward, |index| {
                self.is_selectable(view, row.cell(index).into())
            });

        let Some(index) = found else {
            tracing::debug!(
                grid = ?row.grid,
                row = row.index,
                delta,
                "no selectable cell within probe limit"
            );
            return Movement::Failed;
        };

        match self.select_cell(surface, row.cell(index)) {
            Selection::Changed => Movement::Moved,
            Selection::Unchanged => Movement::Unchanged,
        }
    }

    pub fn is_selectable<S: Surface + ?Sized>(&self, surface: &S, target: Target) -> bool {
        if surface.attribute(target, &self.options.selectable_attribute) == Some("false") {
            return false;
        }

        surface.is_navigable(target.grid())
    }

    /// End the session: take every marker it placed back off and forget the
    /// selection. A new [`Navigator::init_session`] is needed afterwards.
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        for &grid in &self.grids {
            surface.set_navigable(grid, false);
            surface.remove_marker(grid.into(), &self.options.navigable_marker);
        }

        if let Some(grid) = self.selected_table {
            surface.remove_marker(grid.into(), &self.options.selected_table_marker);
        }
        if let Some(row) = self.selected_row {
            surface.remove_marker(row.into(), &self.options.selected_row_marker);
        }
        if let Some(cell) = self.selected_cell {
            surface.remove_marker(cell.into(), &self.options.selected_cell_marker);
        }

        tracing::debug!(grids = self.grids.len(), "navigation session reset");

        let options = std::mem::take(&mut self.options);
        *self = Self {
            options,
            ..Self::default()
        };
    }
}
