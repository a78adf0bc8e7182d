//! Translates terminal key and mouse events into navigator calls.
//!
//! Arrow keys move the cursor, a left click selects the clicked cell. Every
//! other event is passed back to the caller untouched.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::nav::{CellRef, GridId, Movement, Navigator, Surface};

/// Where keyboard focus sits when a key arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// No focusable element has focus.
    Nothing,
    /// A focusable element, inside `grid` if it sits in one.
    Element { grid: Option<GridId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled(Movement),
    PassThrough,
}

const BLOCKING_MODIFIERS: KeyModifiers = KeyModifiers::SHIFT
    .union(KeyModifiers::CONTROL)
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::META)
    .union(KeyModifiers::HYPER);

pub fn handle_key<S: Surface + ?Sized>(
    nav: &mut Navigator,
    surface: &mut S,
    key: KeyEvent,
    focus: Focus,
) -> Dispatch {
    if !can_handle_key(nav, surface, &key, focus) {
        return Dispatch::PassThrough;
    }

    let movement = match key.code {
        KeyCode::Left => nav.move_to_cell(surface, -1),
        KeyCode::Right => nav.move_to_cell(surface, 1),
        KeyCode::Up => nav.move_to_row(surface, -1),
        KeyCode::Down => nav.move_to_row(surface, 1),
        _ => return Dispatch::PassThrough,
    };

    Dispatch::Handled(movement)
}

fn can_handle_key<S: Surface + ?Sized>(
    nav: &Navigator,
    surface: &S,
    key: &KeyEvent,
    focus: Focus,
) -> bool {
    if !nav.is_active() || key.kind == KeyEventKind::Release {
        return false;
    }

    if key.modifiers.intersects(BLOCKING_MODIFIERS) {
        return false;
    }

    match focus {
        Focus::Nothing => true,
        Focus::Element { grid } => grid.is_some_and(|grid| surface.is_navigable(grid)),
    }
}

/// Select `cell` and its row when both are selectable. Returns whether the
/// click was taken.
pub fn handle_click<S: Surface + ?Sized>(
    nav: &mut Navigator,
    surface: &mut S,
    cell: CellRef,
) -> bool {
    if !nav.is_active() {
        return false;
    }

    if !nav.is_selectable(surface, cell.row.into()) || !nav.is_selectable(surface, cell.into()) {
        return false;
    }

    nav.select_row(surface, cell.row);
    nav.select_cell(surface, cell);
    true
}

/// Route a primary-button press through `hit`, which maps a terminal
/// position to the cell drawn there.
pub fn handle_mouse<S: Surface + ?Sized>(
    nav: &mut Navigator,
    surface: &mut S,
    mouse: MouseEvent,
    hit: impl Fn(u16, u16) -> Option<CellRef>,
) -> bool {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return false;
    }

    hit(mouse.column, mouse.row).is_some_and(|cell| handle_click(nav, surface, cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Document;
    use crate::model::workbook::Workbook;
    use crate::nav::{GridModel, NavOptions, RowRef};

    fn setup() -> (Navigator, Workbook, GridId, GridId) {
        let doc: Document = toml::from_str(
            r#"
            [[tables]]
            title = "a"
            [[tables.rows]]
            cells = ["a", "b"]
            [[tables.rows]]
            cells = ["c", { text = "d", selectable = false }]

            [[tables]]
            title = "b"
            navigable = false
            [[tables.rows]]
            cells = ["e"]
            "#,
        )
        .unwrap();
        let mut book = Workbook::from_document(&doc, "selectable");
        let ids: Vec<GridId> = book.iter().map(|(id, _)| id).collect();
        let grids = book.session_grids();
        let mut nav = Navigator::new();
        nav.init_session(&mut book, &grids, NavOptions::default());
        (nav, book, ids[0], ids[1])
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_move_the_cursor() {
        let (mut nav, mut book, grid, _) = setup();

        assert_eq!(
            handle_key(&mut nav, &mut book, key(KeyCode::Right), Focus::Nothing),
            Dispatch::Handled(Movement::Moved)
        );
        assert_eq!(nav.selected_cell(), Some(RowRef::new(grid, 0).cell(1)));

        handle_key(&mut nav, &mut book, key(KeyCode::Down), Focus::Nothing);
        assert_eq!(nav.selected_row(), Some(RowRef::new(grid, 1)));
        assert_eq!(nav.selected_cell(), Some(RowRef::new(grid, 1).cell(0)));

        handle_key(&mut nav, &mut book, key(KeyCode::Up), Focus::Nothing);
        assert_eq!(nav.selected_cell(), Some(RowRef::new(grid, 0).cell(0)));
        assert_eq!(
            handle_key(&mut nav, &mut book, key(KeyCode::Left), Focus::Nothing),
            Dispatch::Handled(Movement::Unchanged)
        );
    }

    #[test]
    fn modified_and_other_keys_pass_through() {
        let (mut nav, mut book, _, _) = setup();
        let before = nav.selected_cell();

        let shifted = KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT);
        let ctrl = KeyEvent::new(KeyCode::Down, KeyModifiers::CONTROL);
        for event in [shifted, ctrl, key(KeyCode::PageDown), key(KeyCode::Char('x'))] {
            assert_eq!(
                handle_key(&mut nav, &mut book, event, Focus::Nothing),
                Dispatch::PassThrough
            );
        }
        assert_eq!(nav.selected_cell(), before);
    }

    #[test]
    fn focus_outside_navigable_grid_passes_through() {
        let (mut nav, mut book, grid, stat) = setup();

        let outside = Focus::Element { grid: None };
        let in_static = Focus::Element { grid: Some(stat) };
        let in_grid = Focus::Element { grid: Some(grid) };

        assert_eq!(
            handle_key(&mut nav, &mut book, key(KeyCode::Right), outside),
            Dispatch::PassThrough
        );
        assert_eq!(
            handle_key(&mut nav, &mut book, key(KeyCode::Right), in_static),
            Dispatch::PassThrough
        );
        assert_eq!(
            handle_key(&mut nav, &mut book, key(KeyCode::Right), in_grid),
            Dispatch::Handled(Movement::Moved)
        );
    }

    #[test]
    fn clicks_only_select_selectable_cells() {
        let (mut nav, mut book, grid, stat) = setup();

        assert!(!handle_click(&mut nav, &mut book, RowRef::new(grid, 1).cell(1)));
        assert!(!handle_click(&mut nav, &mut book, RowRef::new(stat, 0).cell(0)));
        assert_eq!(nav.selected_cell(), Some(RowRef::new(grid, 0).cell(0)));

        assert!(handle_click(&mut nav, &mut book, RowRef::new(grid, 1).cell(0)));
        assert_eq!(nav.selected_row(), Some(RowRef::new(grid, 1)));
        assert_eq!(nav.selected_cell(), Some(RowRef::new(grid, 1).cell(0)));
    }

    #[test]
    fn mouse_press_resolves_through_hit_test() {
        let (mut nav, mut book, grid, _) = setup();
        let target = RowRef::new(grid, 0).cell(1);
        let hit = |column: u16, row: u16| (column == 4 && row == 2).then_some(target);

        let press = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        assert!(!handle_mouse(&mut nav, &mut book, press(0, 0), hit));
        assert!(handle_mouse(&mut nav, &mut book, press(4, 2), hit));
        assert_eq!(nav.selected_cell(), Some(target));
    }

    #[test]
    fn reset_detaches_input() {
        let (mut nav, mut book, grid, _) = setup();
        nav.reset(&mut book);

        assert_eq!(
            handle_key(&mut nav, &mut book, key(KeyCode::Down), Focus::Nothing),
            Dispatch::PassThrough
        );
        assert!(!handle_click(&mut nav, &mut book, RowRef::new(grid, 1).cell(0)));
        assert!(!book.is_navigable(grid));
    }
}
