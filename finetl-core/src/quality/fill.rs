//! Gap filling over optional columns.

/// Replace each missing value with the last present value before it.
/// Returns how many cells were filled.
pub fn forward_fill<T: Copy>(values: &mut [Option<T>]) -> usize {
    let mut last = None;
    let mut filled = 0;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => {
                if last.is_some() {
                    *value = last;
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Replace each missing value with the next present value after it.
pub fn backward_fill<T: Copy>(values: &mut [Option<T>]) -> usize {
    let mut next = None;
    let mut filled = 0;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => {
                if next.is_some() {
                    *value = next;
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Forward fill, then backward fill whatever leading gap remains.
pub fn fill_both<T: Copy>(values: &mut [Option<T>]) -> usize {
    forward_fill(values) + backward_fill(values)
}

/// Fraction of missing cells, 0 for an empty column.
pub fn missing_fraction<T>(values: &[Option<T>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| v.is_none()).count() as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_fill_leaves_leading_gap() {
        let mut values = [None, Some(1.0), None, None, Some(4.0), None];
        assert_eq!(forward_fill(&mut values), 3);
        assert_eq!(values, [None, Some(1.0), Some(1.0), Some(1.0), Some(4.0), Some(4.0)]);
    }

    #[test]
    fn fill_both_closes_every_gap() {
        let mut values = [None, None, Some(2), None];
        assert_eq!(fill_both(&mut values), 3);
        assert_eq!(values, [Some(2), Some(2), Some(2), Some(2)]);
    }

    #[test]
    fn all_missing_stays_missing() {
        let mut values: [Option<f64>; 3] = [None; 3];
        assert_eq!(fill_both(&mut values), 0);
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn missing_fraction_counts_none() {
        assert_eq!(missing_fraction(&[Some(1), None, None, Some(2)]), 0.5);
        assert_eq!(missing_fraction::<i32>(&[]), 0.0);
    }
}
