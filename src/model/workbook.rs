use slotmap::SlotMap;
use smallvec::SmallVec;

use super::document::{Document, TableSpec};
use crate::nav::{GridId, GridModel, Presentation, RowRef, Target};

/// Markers and attributes carried by one table, row or cell.
#[derive(Debug, Clone, Default)]
pub struct Marks {
    markers: SmallVec<[String; 2]>,
    attributes: SmallVec<[(String, String); 1]>,
}

impl Marks {
    pub fn has(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }

    fn apply(&mut self, marker: &str) {
        if !self.has(marker) {
            self.markers.push(marker.to_string());
        }
    }

    fn remove(&mut self, marker: &str) {
        self.markers.retain(|m| m != marker);
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub marks: Marks,
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub marks: Marks,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub title: String,
    /// Whether the document asks for this table to join navigation.
    pub wants_navigation: bool,
    navigable: bool,
    pub rows: Vec<Row>,
    pub marks: Marks,
}

impl Table {
    /// Display width of each column, in characters.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (idx, cell) in row.cells.iter().enumerate() {
                let width = cell.text.chars().count();
                match widths.get_mut(idx) {
                    Some(existing) => *existing = (*existing).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }
}

/// The tables of one document, in document order.
#[derive(Debug, Default)]
pub struct Workbook {
    tables: SlotMap<GridId, Table>,
    order: Vec<GridId>,
}

impl Workbook {
    /// Build tables from `doc`, recording explicit selectability under
    /// `selectable_attribute`.
    pub fn from_document(doc: &Document, selectable_attribute: &str) -> Self {
        let mut workbook = Self::default();
        for def in &doc.tables {
            let table = build_table(def, selectable_attribute);
            let id = workbook.tables.insert(table);
            workbook.order.push(id);
        }
        workbook
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn table(&self, id: GridId) -> Option<&Table> {
        self.tables.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridId, &Table)> {
        self.order
            .iter()
            .filter_map(|&id| self.tables.get(id).map(|table| (id, table)))
    }

    /// Tables that should take part in a navigation session.
    pub fn session_grids(&self) -> Vec<GridId> {
        self.iter()
            .filter(|(_, table)| table.wants_navigation)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn marks(&self, target: Target) -> Option<&Marks> {
        match target {
            Target::Grid(grid) => self.tables.get(grid).map(|table| &table.marks),
            Target::Row(row) => self.row(row).map(|row| &row.marks),
            Target::Cell(cell) => self
                .row(cell.row)
                .and_then(|row| row.cells.get(cell.index))
                .map(|cell| &cell.marks),
        }
    }

    fn marks_mut(&mut self, target: Target) -> Option<&mut Marks> {
        match target {
            Target::Grid(grid) => self.tables.get_mut(grid).map(|table| &mut table.marks),
            Target::Row(row) => self.row_mut(row).map(|row| &mut row.marks),
            Target::Cell(cell) => self
                .row_mut(cell.row)
                .and_then(|row| row.cells.get_mut(cell.index))
                .map(|cell| &mut cell.marks),
        }
    }

    fn row(&self, row: RowRef) -> Option<&Row> {
        self.tables
            .get(row.grid)
            .and_then(|table| table.rows.get(row.index))
    }

    fn row_mut(&mut self, row: RowRef) -> Option<&mut Row> {
        self.tables
            .get_mut(row.grid)
            .and_then(|table| table.rows.get_mut(row.index))
    }
}

fn build_table(def: &TableSpec, selectable_attribute: &str) -> Table {
    let rows = def
        .rows
        .iter()
        .map(|row_def| {
            let mut row = Row::default();
            if let Some(selectable) = row_def.selectable {
                row.marks
                    .set_attribute(selectable_attribute, bool_text(selectable));
            }
            row.cells = row_def
                .cells
                .iter()
                .map(|cell_def| {
                    let mut marks = Marks::default();
                    if let Some(selectable) = cell_def.selectable() {
                        marks.set_attribute(selectable_attribute, bool_text(selectable));
                    }
                    Cell {
                        text: cell_def.text().to_string(),
                        marks,
                    }
                })
                .collect();
            row
        })
        .collect();

    Table {
        title: def.title.clone(),
        wants_navigation: def.navigable,
        navigable: false,
        rows,
        marks: Marks::default(),
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

impl GridModel for Workbook {
    fn row_count(&self, grid: GridId) -> usize {
        self.tables.get(grid).map_or(0, |table| table.rows.len())
    }

    fn cell_count(&self, row: RowRef) -> usize {
        self.row(row).map_or(0, |row| row.cells.len())
    }

    fn is_navigable(&self, grid: GridId) -> bool {
        self.tables.get(grid).is_some_and(|table| table.navigable)
    }

    fn set_navigable(&mut self, grid: GridId, navigable: bool) {
        if let Some(table) = self.tables.get_mut(grid) {
            table.navigable = navigable;
        }
    }
}

impl Presentation for Workbook {
    fn apply_marker(&mut self, target: Target, marker: &str) {
        match self.marks_mut(target) {
            Some(marks) => marks.apply(marker),
            None => tracing::warn!(?target, marker, "marker applied to unknown element"),
        }
    }

    fn remove_marker(&mut self, target: Target, marker: &str) {
        if let Some(marks) = self.marks_mut(target) {
            marks.remove(marker);
        }
    }

    fn has_marker(&self, target: Target, marker: &str) -> bool {
        self.marks(target).is_some_and(|marks| marks.has(marker))
    }

    fn attribute(&self, target: Target, name: &str) -> Option<&str> {
        self.marks(target).and_then(|marks| marks.attribute(name))
    }
}
