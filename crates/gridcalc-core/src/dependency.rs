//! Walks over the cell reference graph.
//!
//! Edges live on the cells themselves: `references` are forward edges
//! (cells a formula reads) and `dependents` are the reverse index. Both
//! walks here are iterative so their stack usage does not grow with the
//! length of a dependency chain.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::trace;

use crate::cell::Cell;
use crate::position::Position;

/// Check if giving `cell` the forward edges `candidate` would create a cycle
///
/// Breadth-first walk from `cell`: the candidate edges stand in for the
/// cell's own, every other cell contributes its committed references, and
/// absent positions have no outgoing edges. Since the committed graph is
/// acyclic, a new cycle must pass through `cell`, so reaching it again is
/// the only condition checked.
///
/// Reaching some other position twice is not a cycle: a formula may read two
/// cells that both read a third (a diamond). A plain revisit test would
/// reject such formulas; this check accepts them.
pub fn would_create_cycle(
    cells: &HashMap<Position, Cell>,
    cell: Position,
    candidate: &[Position],
) -> bool {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(cell);
    queue.push_back(cell);

    while let Some(current) = queue.pop_front() {
        let edges = if current == cell {
            candidate
        } else {
            match cells.get(&current) {
                Some(c) => c.references(),
                None => continue,
            }
        };

        for &next in edges {
            if next == cell {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    false
}

/// Formula cells `root` needs evaluated, dependencies first
///
/// Depth-first walk over forward edges that stops at cells which are not
/// formulas or already hold a memoized value. Evaluating the returned cells in
/// order lets each one find every formula it reads already memoized, so no
/// evaluation nests inside another however long the reference chain. `root`
/// comes last unless it needs no evaluation, in which case the list is empty.
pub fn evaluation_order(cells: &HashMap<Position, Cell>, root: Position) -> Vec<Position> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(root, false)];

    while let Some((current, expanded)) = stack.pop() {
        if expanded {
            order.push(current);
            continue;
        }
        if !visited.insert(current) {
            continue;
        }
        let Some(cell) = cells.get(&current) else {
            continue;
        };
        if !cell.is_formula() || cell.has_cached_value() {
            continue;
        }

        stack.push((current, true));
        for &next in cell.references().iter().rev() {
            if !visited.contains(&next) {
                stack.push((next, false));
            }
        }
    }

    order
}

/// Clear the memoized value of every cell that transitively reads `roots`
///
/// `roots` are the direct dependents of the changed cell. Returns the number
/// of cells visited.
pub fn invalidate_dependents(
    cells: &HashMap<Position, Cell>,
    roots: impl IntoIterator<Item = Position>,
) -> usize {
    let mut visited = HashSet::new();
    let mut queue: VecDeque<Position> = roots.into_iter().collect();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(cell) = cells.get(&current) {
            if cell.has_cached_value() {
                trace!(cell = %current, "invalidated cached value");
            }
            cell.invalidate_cache();
            queue.extend(cell.dependents().iter().copied());
        }
    }

    visited.len()
}

/// `roots` plus every cell that transitively reads them, in breadth-first order
pub fn transitive_dependents(
    cells: &HashMap<Position, Cell>,
    roots: impl IntoIterator<Item = Position>,
) -> Vec<Position> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut queue: VecDeque<Position> = roots.into_iter().collect();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        order.push(current);
        if let Some(cell) = cells.get(&current) {
            queue.extend(cell.dependents().iter().copied());
        }
    }

    order
}
