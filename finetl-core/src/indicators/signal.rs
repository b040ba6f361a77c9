//! Moving-average crossover state.

/// +1 where `short > long`, -1 where `short < long`, 0 on ties or when either
/// average is undefined.
pub fn ma_signal(short: &[f64], long: &[f64]) -> Vec<i8> {
    short
        .iter()
        .zip(long)
        .map(|(&s, &l)| {
            if s > l {
                1
            } else if s < l {
                -1
            } else {
                0
            }
        })
        .collect()
}
