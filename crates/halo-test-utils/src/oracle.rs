//! Brute-force reference implementations of proximity queries.

use halo_core::RealPoint;
use halo_storage::{ContinuousStorage, ObjectHandle};

/// Every object other than `exclude` within `radius` of `point`, in
/// storage iteration order.
pub fn within<'a, H: ObjectHandle>(
    storage: &'a ContinuousStorage<H>,
    point: &RealPoint,
    radius: f64,
    exclude: Option<&H>,
) -> Vec<&'a H> {
    storage
        .objects()
        .filter(|(h, loc)| Some(*h) != exclude && loc.euclidean(point) <= radius)
        .map(|(h, _)| h)
        .collect()
}

/// Distances from `point` to every object other than `exclude`, ascending.
pub fn sorted_distances<H: ObjectHandle>(
    storage: &ContinuousStorage<H>,
    point: &RealPoint,
    exclude: Option<&H>,
) -> Vec<f64> {
    let mut d: Vec<f64> = storage
        .objects()
        .filter(|(h, _)| Some(*h) != exclude)
        .map(|(_, loc)| loc.euclidean(point))
        .collect();
    d.sort_by(f64::total_cmp);
    d
}

/// Check that `answer` is a valid k-nearest result for `point`: the right
/// length, ascending, and at each rank exactly as far as the true distance
/// at that rank. Ties make the object set ambiguous, so only distances are
/// compared.
pub fn is_valid_knn<H: ObjectHandle>(
    storage: &ContinuousStorage<H>,
    point: &RealPoint,
    k: usize,
    exclude: Option<&H>,
    answer: &[&H],
) -> bool {
    let truth = sorted_distances(storage, point, exclude);
    if answer.len() != k.min(truth.len()) {
        return false;
    }
    answer.iter().zip(&truth).all(|(h, &want)| {
        Some(*h) != exclude
            && storage
                .location(h)
                .is_some_and(|loc| loc.euclidean(point) == want)
    })
}
