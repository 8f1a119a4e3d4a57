//! Continuous storage queries checked against brute-force oracles.

use halo_core::{IntPoint, IntRect, RealPoint, RealRect};
use halo_storage::{ContinuousStorage, RegionStorage, StorageError};
use halo_test_utils::{assert_consistent, oracle, scatter};
use proptest::prelude::*;

fn irect(lo: [i32; 2], hi: [i32; 2]) -> IntRect {
    IntRect::new(IntPoint::from(lo), IntPoint::from(hi)).unwrap()
}

fn rrect(lo: [f64; 2], hi: [f64; 2]) -> RealRect {
    RealRect::new(RealPoint::from(lo), RealPoint::from(hi)).unwrap()
}

fn populated(n: usize, seed: u64, cell: f64) -> ContinuousStorage<usize> {
    let shape = irect([10, 20], [60, 70]);
    let mut s = ContinuousStorage::new(shape.clone(), &[cell, cell]).unwrap();
    for (i, p) in scatter(&shape.to_real(), n, seed).into_iter().enumerate() {
        s.set_location(i, p).unwrap();
    }
    s
}

fn sorted(mut v: Vec<&usize>) -> Vec<usize> {
    v.sort();
    v.into_iter().copied().collect()
}

// ── Reference scenario ──────────────────────────────────────────

#[test]
fn rectangle_query_scenario() {
    let mut s = ContinuousStorage::new(irect([10, 20], [60, 70]), &[10.0, 10.0]).unwrap();
    s.set_location('A', RealPoint::from([23.4, 30.2])).unwrap();
    s.set_location('B', RealPoint::from([29.99, 39.99])).unwrap();
    s.set_location('C', RealPoint::from([31.0, 45.6])).unwrap();

    let mut hit: Vec<char> = s
        .objects_in(&rrect([25.0, 35.0], [35.0, 47.0]))
        .into_iter()
        .copied()
        .collect();
    hit.sort();
    assert_eq!(hit, vec!['B', 'C']);

    s.remove_object(&'A').unwrap();
    let mut all: Vec<char> = s
        .objects_in(&rrect([10.0, 20.0], [60.0, 70.0]))
        .into_iter()
        .copied()
        .collect();
    all.sort();
    assert_eq!(all, vec!['B', 'C']);
    assert_eq!(
        s.remove_object(&'A'),
        Err(StorageError::UnknownObject {
            handle: "'A'".into()
        })
    );
    assert_consistent(&s);
}

// ── Region transfer ─────────────────────────────────────────────

#[test]
fn pack_into_fresh_storage_at_same_offset() {
    let src = populated(300, 11, 3.0);
    let region = irect([5, 5], [30, 25]);
    let packed = src.pack(std::slice::from_ref(&region)).unwrap();

    // Destination frame differs, but the region lands on the same global cells.
    let mut dst = ContinuousStorage::new(irect([0, 0], [80, 80]), &[7.0, 7.0]).unwrap();
    dst.unpack(&[irect([15, 25], [40, 45])], packed).unwrap();

    let global = region.to_global(src.shape().lower()).to_real();
    let mut expected: Vec<(usize, Vec<f64>)> = src
        .objects()
        .filter(|(_, loc)| global.contains(loc))
        .map(|(h, loc)| (*h, loc.coords().to_vec()))
        .collect();
    let mut got: Vec<(usize, Vec<f64>)> = dst
        .objects()
        .map(|(h, loc)| (*h, loc.coords().to_vec()))
        .collect();
    expected.sort_by_key(|e| e.0);
    got.sort_by_key(|e| e.0);
    assert!(!expected.is_empty());
    assert_eq!(got, expected);
    assert_consistent(&dst);
}

#[test]
fn full_pack_unpack_is_identity() {
    let src = populated(200, 5, 4.0);
    let whole = irect([0, 0], [50, 50]);
    let packed = src.pack(std::slice::from_ref(&whole)).unwrap();

    let mut dst = ContinuousStorage::new(src.shape().clone(), src.discretization()).unwrap();
    dst.set_location(9999, RealPoint::from([11.0, 21.0])).unwrap();
    dst.unpack(std::slice::from_ref(&whole), packed.clone()).unwrap();
    assert_eq!(dst.len(), src.len());
    for (h, loc) in src.objects() {
        assert_eq!(dst.location(h), Some(loc));
    }

    // A second unpack of the same payload changes nothing.
    dst.unpack(std::slice::from_ref(&whole), packed).unwrap();
    assert_eq!(dst.len(), src.len());
    assert_consistent(&dst);
}

#[test]
fn reshape_retaining_keeps_objects_in_overlap() {
    let mut s = populated(250, 3, 5.0);
    let before: Vec<(usize, RealPoint)> = s.objects().map(|(h, l)| (*h, l.clone())).collect();
    let new_shape = irect([30, 40], [90, 90]);
    s.reshape_retaining(new_shape.clone()).unwrap();

    let kept = new_shape.to_real();
    for (h, loc) in &before {
        let inside = kept.contains(loc) && loc.coords()[0] < 60.0 && loc.coords()[1] < 70.0;
        assert_eq!(s.location(h) == Some(loc), inside, "object {h} at {loc:?}");
    }
    assert_consistent(&s);
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn knn_matches_brute_force(
        seed in 0u64..1000,
        n in 1usize..120,
        k in 0usize..12,
        cell in prop::sample::select(vec![0.7, 2.5, 10.0, 60.0]),
    ) {
        let s = populated(n, seed, cell);
        let q = (seed as usize) % n;
        let answer = s.nearest_neighbors(&q, k).unwrap();
        let loc = s.location(&q).unwrap().clone();
        prop_assert!(oracle::is_valid_knn(&s, &loc, k, Some(&q), &answer));
    }

    #[test]
    fn nearest_to_outside_point_matches_brute_force(
        seed in 0u64..1000,
        n in 1usize..80,
        k in 1usize..8,
        x in -40.0f64..120.0,
        y in -40.0f64..120.0,
    ) {
        let s = populated(n, seed, 4.0);
        let point = RealPoint::from([x, y]);
        let answer = s.nearest_to(&point, k);
        prop_assert!(oracle::is_valid_knn(&s, &point, k, None, &answer));
    }

    #[test]
    fn radius_matches_brute_force(
        seed in 0u64..1000,
        n in 1usize..150,
        radius in 0.0f64..30.0,
        cell in prop::sample::select(vec![0.5, 3.0, 9.0, 55.0]),
    ) {
        let s = populated(n, seed, cell);
        let q = (seed as usize) % n;
        let got = sorted(s.neighbors_within(&q, radius).unwrap());
        let loc = s.location(&q).unwrap().clone();
        let want = sorted(oracle::within(&s, &loc, radius, Some(&q)));
        prop_assert_eq!(got, want);
    }

    #[test]
    fn rect_query_matches_brute_force(
        seed in 0u64..1000,
        x0 in 0.0f64..70.0,
        y0 in 10.0f64..80.0,
        w in 0.0f64..30.0,
        h in 0.0f64..30.0,
    ) {
        let s = populated(150, seed, 6.0);
        let rect = rrect([x0, y0], [x0 + w, y0 + h]);
        let got = sorted(s.objects_in(&rect));
        let want: Vec<usize> = {
            let mut v: Vec<usize> = s
                .objects()
                .filter(|(_, loc)| rect.contains(loc))
                .map(|(h, _)| *h)
                .collect();
            v.sort();
            v
        };
        prop_assert_eq!(got, want);
    }
}
