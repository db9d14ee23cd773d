//! One-level flattening of nested sequences.

/// Flatten a sequence of sequences into a single vector.
///
/// Exactly one level of nesting is removed and the relative order of every
/// element is preserved.
pub fn flatten<I, T>(xss: I) -> Vec<T>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = T>,
{
    xss.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten() {
        let nested = vec![vec![1, 2], vec![3, 4], vec![5]];
        assert_eq!(flatten(nested), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_flatten_empty() {
        let nested: Vec<Vec<i32>> = Vec::new();
        assert!(flatten(nested).is_empty());

        let with_empty_inner = vec![vec![], vec!["a"], vec![]];
        assert_eq!(flatten(with_empty_inner), vec!["a"]);
    }

    #[test]
    fn test_flatten_only_one_level() {
        let nested = vec![vec![vec![1, 2]], vec![vec![3]]];
        let flat = flatten(nested);
        assert_eq!(flat, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_flatten_length_and_order() {
        let nested: Vec<Vec<usize>> = (0..6).map(|n| (0..n).map(|i| n * 10 + i).collect()).collect();
        let expected_len: usize = nested.iter().map(Vec::len).sum();
        let flat = flatten(nested.clone());
        assert_eq!(flat.len(), expected_len);

        let mut cursor = flat.iter();
        for inner in &nested {
            for x in inner {
                assert_eq!(cursor.next(), Some(x));
            }
        }
        assert!(cursor.next().is_none());
    }
}
