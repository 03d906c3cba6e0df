use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored item ordered by score, then by ascending id: of two equal scores
/// the smaller id ranks higher.
struct Ranked<'a, T> {
    score: OrderedFloat<f64>,
    id: &'a str,
    item: T,
}

impl<T> PartialEq for Ranked<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<'_, T> {}

impl<T> PartialOrd for Ranked<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score).then_with(|| other.id.cmp(self.id))
    }
}

/// The `k` best `(id, item, score)` entries, best first.
///
/// Uses a bounded min-heap, O(n log k).
pub fn select<'a, T, I>(scored: I, k: usize) -> Vec<(T, f64)>
where
    I: IntoIterator<Item = (&'a str, T, f64)>,
{
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<Ranked<'a, T>>> = BinaryHeap::with_capacity(k + 1);
    for (id, item, score) in scored {
        heap.push(Reverse(Ranked { score: OrderedFloat(score), id, item }));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut ranked: Vec<Ranked<'a, T>> = heap.into_iter().map(|Reverse(r)| r).collect();
    ranked.sort_unstable_by(|a, b| b.cmp(a));
    ranked.into_iter().map(|r| (r.item, r.score.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_k_best_in_descending_order() {
        let scored = vec![("a", 1, 0.5), ("b", 2, 2.0), ("c", 3, 1.0), ("d", 4, 0.1)];
        let top = select(scored, 2);
        assert_eq!(top, vec![(2, 2.0), (3, 1.0)]);
    }

    #[test]
    fn ties_go_to_smaller_id() {
        let scored = vec![("b", "b", 1.0), ("c", "c", 1.0), ("a", "a", 1.0)];
        let top = select(scored, 2);
        assert_eq!(top, vec![("a", 1.0), ("b", 1.0)]);
    }

    #[test]
    fn short_input_and_zero_k() {
        assert_eq!(select(vec![("a", (), 1.0)], 5).len(), 1);
        assert!(select(vec![("a", (), 1.0)], 0).is_empty());
        assert!(select(Vec::<(&str, (), f64)>::new(), 3).is_empty());
    }
}
