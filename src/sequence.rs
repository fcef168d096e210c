//! Sequence linking for chronologically ordered items.

/// The neighbors of one item in a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbors<T> {
    pub previous: Option<T>,
    pub next: Option<T>,
}

/// Links `items` (which must already be in sequence order, oldest first) and
/// returns the neighbors for each item at the same index. The first item has
/// no `previous` and the last has no `next`.
pub fn link<T: Copy>(items: &[T]) -> Vec<Neighbors<T>> {
    items
        .iter()
        .enumerate()
        .map(|(k, _)| Neighbors {
            previous: match k < 1 {
                true => None,
                false => Some(items[k - 1]),
            },
            next: items.get(k + 1).copied(),
        })
        .collect()
}
