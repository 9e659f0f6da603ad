//! Board Layout Utilities
//!
//! Pure ordering math for the column grid: grouping lists into columns,
//! column-major neighbor lookup, keyboard move-target geometry, and the
//! dense renumbering that restores the order invariant after any reorder.
//! All functions are total; bad input yields `None` or an empty result.

use crate::domain::List;

/// Traversal direction through the flattened column-major order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traverse {
    Next,
    Prev,
}

/// Keyboard movement direction in the column grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

/// A (column, row) position in the grouped layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub column: usize,
    pub row: usize,
}

/// Partition lists into `column_count` buckets by `column_index`.
///
/// Indices beyond the column count clamp into the last bucket so a board
/// whose column count shrank still shows every list. Each bucket is sorted
/// by `order`, ties broken by `id` for determinism.
pub fn group_into_columns(lists: &[List], column_count: usize) -> Vec<Vec<List>> {
    let mut columns: Vec<Vec<List>> = vec![Vec::new(); column_count.max(1)];
    let last = columns.len() - 1;
    for list in lists {
        let idx = if list.column_index < 0 {
            0
        } else {
            (list.column_index as usize).min(last)
        };
        columns[idx].push(list.clone());
    }
    for column in &mut columns {
        column.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
    }
    columns
}

/// Flatten grouped columns into column-major read order: each column
/// top-to-bottom before advancing to the next column.
pub fn flatten_columns(columns: &[Vec<List>]) -> Vec<&List> {
    columns.iter().flatten().collect()
}

/// Id of the adjacent list in column-major read order, or `None` at
/// either end (or when `current_id` is not on the board).
pub fn find_neighbor(current_id: u64, columns: &[Vec<List>], direction: Traverse) -> Option<u64> {
    let flat = flatten_columns(columns);
    let pos = flat.iter().position(|l| l.id == current_id)?;
    match direction {
        Traverse::Next => flat.get(pos + 1).map(|l| l.id),
        Traverse::Prev => {
            if pos == 0 {
                None
            } else {
                flat.get(pos - 1).map(|l| l.id)
            }
        }
    }
}

/// Locate a list in the grouped layout
pub fn position_of(list_id: u64, columns: &[Vec<List>]) -> Option<GridPosition> {
    for (column, bucket) in columns.iter().enumerate() {
        if let Some(row) = bucket.iter().position(|l| l.id == list_id) {
            return Some(GridPosition { column, row });
        }
    }
    None
}

/// Destination of a keyboard move in the column grid, or `None` when the
/// move is out of bounds (`Up` at row 0, `Down` at the last row, `Left`
/// at column 0, `Right` at the last column).
///
/// `Left`/`Right` always land at the end of the destination column; the
/// returned row is the destination's current length, i.e. an append slot
/// (the moved item is assumed to still occupy its source column).
pub fn compute_move_target(
    position: GridPosition,
    direction: MoveDirection,
    columns: &[Vec<List>],
) -> Option<GridPosition> {
    if columns.is_empty() || position.column >= columns.len() {
        return None;
    }
    match direction {
        MoveDirection::Up => {
            if position.row == 0 {
                None
            } else {
                Some(GridPosition {
                    column: position.column,
                    row: position.row - 1,
                })
            }
        }
        MoveDirection::Down => {
            let len = columns[position.column].len();
            if position.row + 1 >= len {
                None
            } else {
                Some(GridPosition {
                    column: position.column,
                    row: position.row + 1,
                })
            }
        }
        MoveDirection::Left => {
            if position.column == 0 {
                None
            } else {
                let dest = position.column - 1;
                Some(GridPosition {
                    column: dest,
                    row: columns[dest].len(),
                })
            }
        }
        MoveDirection::Right => {
            if position.column + 1 >= columns.len() {
                None
            } else {
                let dest = position.column + 1;
                Some(GridPosition {
                    column: dest,
                    row: columns[dest].len(),
                })
            }
        }
    }
}

/// Reassign `order = array index` over an ordered slice of orderables.
/// Restores the dense 0..n-1 invariant after any reorder.
pub fn renumber_sequential<T, F>(items: &mut [T], mut set_order: F)
where
    F: FnMut(&mut T, i64),
{
    for (index, item) in items.iter_mut().enumerate() {
        set_order(item, index as i64);
    }
}
