use std::cmp::Ordering;

/// Binary search over a slice kept in ascending key order.
///
/// `key_of` extracts the sort key of an element; `None` means the key is not
/// present. Used for both the term vocabulary and per-term postings.
pub fn find_sorted<'a, T, K, F>(items: &'a [T], key: &K, key_of: F) -> Option<usize>
where
    K: Ord + ?Sized + 'a,
    F: Fn(&'a T) -> &'a K,
{
    items.binary_search_by(|item| key_of(item).cmp(key)).ok()
}

/// True when every key is strictly greater than the one before it.
pub fn is_strictly_ascending<'a, T, K, F>(items: &'a [T], key_of: F) -> bool
where
    K: Ord + ?Sized + 'a,
    F: Fn(&'a T) -> &'a K,
{
    items
        .windows(2)
        .all(|pair| key_of(&pair[0]).cmp(key_of(&pair[1])) == Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_present_keys() {
        let items = vec![("a", 1), ("c", 2), ("f", 3)];
        assert_eq!(find_sorted(&items, "c", |(k, _)| *k), Some(1));
        assert_eq!(find_sorted(&items, "f", |(k, _)| *k), Some(2));
    }

    #[test]
    fn misses_are_none() {
        let items = vec![("a", 1), ("c", 2)];
        assert_eq!(find_sorted(&items, "b", |(k, _)| *k), None);
        assert_eq!(find_sorted(&items, "z", |(k, _)| *k), None);
        let empty: Vec<(&str, i32)> = Vec::new();
        assert_eq!(find_sorted(&empty, "a", |(k, _)| *k), None);
    }

    #[test]
    fn detects_order() {
        assert!(is_strictly_ascending(&[1, 2, 5], |k| k));
        assert!(!is_strictly_ascending(&[1, 1, 5], |k| k));
        assert!(!is_strictly_ascending(&[3, 2], |k| k));
    }
}
