/// Colour index assigned to the transformation at `index`.
///
/// 0 and 1 map to themselves; later indices bisect the gaps left by the
/// earlier ones (0.5, 0.25, 0.75, 0.125, ...).
#[must_use]
pub fn color_index_of(index: usize) -> f64 {
    if index < 2 {
        return index as f64;
    }

    let p = index.next_power_of_two();
    ((2 * index - 1) % p) as f64 / p as f64
}

/// Colour indices for the first `count` transformations.
#[must_use]
pub fn color_indices(count: usize) -> Vec<f64> {
    (0..count).map(color_index_of).collect()
}
