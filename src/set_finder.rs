//! Catalog enumeration: every valid set constructible as a subset of a pool.

use std::collections::BTreeMap;

use crate::{Color, GameSet, SetType, Tile};

/// Enumerate the deduplicated catalog of all valid sets (runs and groups)
/// constructible as a subset of the pool. Duplicate tiles are allowed in the
/// pool; value-identical candidates built from different instances collapse
/// to one catalog entry. The result is independent of the pool's order.
pub fn enumerate_all_sets(pool: &[Tile]) -> Vec<GameSet> {
    let mut catalog = find_all_runs(pool);
    catalog.append(&mut find_all_groups(pool));

    // Canonical tile order inside each set makes sort + dedup well-defined.
    catalog.sort_unstable();
    catalog.dedup();
    catalog
}

/// Find every run of length >= 3, including all sub-windows of longer
/// stretches (b1..b4 yields b1-b3, b1-b4 and b2-b4).
fn find_all_runs(pool: &[Tile]) -> Vec<GameSet> {
    let mut runs = Vec::new();
    if pool.len() < 3 {
        return runs;
    }

    let mut by_color: BTreeMap<Color, Vec<Tile>> = BTreeMap::new();
    for &tile in pool {
        by_color.entry(tile.color()).or_default().push(tile);
    }

    for bucket in by_color.values_mut() {
        bucket.sort_unstable();
        // A run uses each number at most once, so duplicate instances add no
        // windows and would only break consecutive stretches apart. Physical
        // availability is still checked instance-for-instance when a
        // candidate is matched against the pool.
        bucket.dedup();
        if bucket.len() < 3 {
            continue;
        }
        for start in 0..bucket.len() {
            for end in (start + 1)..bucket.len() {
                // A gap breaks every longer window too.
                if bucket[end].number() != bucket[end - 1].number() + 1 {
                    break;
                }
                if end - start >= 2 {
                    let run = GameSet::new(SetType::Run, bucket[start..=end].to_vec());
                    debug_assert!(run.is_valid());
                    runs.push(run);
                }
            }
        }
    }

    runs
}

/// Find every group: all 3- and 4-tile combinations of a number bucket whose
/// colors are pairwise distinct.
fn find_all_groups(pool: &[Tile]) -> Vec<GameSet> {
    let mut groups = Vec::new();
    if pool.len() < 3 {
        return groups;
    }

    let mut by_number: BTreeMap<u8, Vec<Tile>> = BTreeMap::new();
    for &tile in pool {
        by_number.entry(tile.number()).or_default().push(tile);
    }

    for bucket in by_number.values_mut() {
        bucket.sort_unstable();
        for size in 3..=4 {
            if bucket.len() < size {
                break;
            }
            emit_group_combinations(bucket, size, &mut groups);
        }
    }

    groups
}

/// Walk all index combinations of the given size, keeping the candidates
/// that pass the group rules.
fn emit_group_combinations(bucket: &[Tile], size: usize, groups: &mut Vec<GameSet>) {
    let mut combo: Vec<usize> = (0..size).collect();
    loop {
        let tiles: Vec<Tile> = combo.iter().map(|&i| bucket[i]).collect();
        let candidate = GameSet::new(SetType::Group, tiles);
        if candidate.is_valid() {
            groups.push(candidate);
        }
        if !next_combination(&mut combo, bucket.len()) {
            break;
        }
    }
}

/// Advance to the next index combination in lexicographic order
fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    if k == 0 {
        return false;
    }

    // Find the rightmost element that can be incremented
    let mut i = k;
    while i > 0 {
        i -= 1;
        if combo[i] < n - k + i {
            combo[i] += 1;
            // Reset all elements to the right
            for j in (i + 1)..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(s: &str) -> Tile {
        s.parse().unwrap()
    }

    fn tiles(spec: &str) -> Vec<Tile> {
        spec.split_whitespace().map(tile).collect()
    }

    fn sorted(mut catalog: Vec<GameSet>) -> Vec<GameSet> {
        catalog.sort_unstable();
        catalog
    }

    #[test]
    fn test_basic_run() {
        let catalog = enumerate_all_sets(&tiles("r1 r2 r3"));
        assert_eq!(catalog, vec![GameSet::run(tiles("r1 r2 r3"))]);
    }

    #[test]
    fn test_run_subwindows() {
        let catalog = enumerate_all_sets(&tiles("b1 b2 b3 b4"));
        let expected = sorted(vec![
            GameSet::run(tiles("b1 b2 b3")),
            GameSet::run(tiles("b1 b2 b3 b4")),
            GameSet::run(tiles("b2 b3 b4")),
        ]);
        assert_eq!(sorted(catalog), expected);
    }

    #[test]
    fn test_run_broken_by_gap() {
        // b5 is missing, so nothing spans the gap
        let catalog = enumerate_all_sets(&tiles("b1 b2 b3 b4 b6 b7 b8"));
        let expected = sorted(vec![
            GameSet::run(tiles("b1 b2 b3")),
            GameSet::run(tiles("b1 b2 b3 b4")),
            GameSet::run(tiles("b2 b3 b4")),
            GameSet::run(tiles("b6 b7 b8")),
        ]);
        assert_eq!(sorted(catalog), expected);
    }

    #[test]
    fn test_basic_group() {
        let catalog = enumerate_all_sets(&tiles("r3 b3 y3"));
        assert_eq!(catalog, vec![GameSet::group(tiles("b3 r3 y3"))]);
    }

    #[test]
    fn test_group_combinations_of_four() {
        let catalog = enumerate_all_sets(&tiles("r7 b7 y7 p7"));
        let expected = sorted(vec![
            GameSet::group(tiles("b7 p7 r7")),
            GameSet::group(tiles("b7 p7 y7")),
            GameSet::group(tiles("b7 r7 y7")),
            GameSet::group(tiles("p7 r7 y7")),
            GameSet::group(tiles("b7 p7 r7 y7")),
        ]);
        assert_eq!(sorted(catalog), expected);
    }

    #[test]
    fn test_mixed_run_and_group() {
        let catalog = enumerate_all_sets(&tiles("r1 r2 r3 b3 y3"));
        let expected = sorted(vec![
            GameSet::run(tiles("r1 r2 r3")),
            GameSet::group(tiles("b3 r3 y3")),
        ]);
        assert_eq!(sorted(catalog), expected);
    }

    #[test]
    fn test_duplicate_tiles_dedup() {
        // Two physical b7 instances generate the same group candidates from
        // different index positions; the catalog keeps one of each.
        let catalog = enumerate_all_sets(&tiles("b7 b7 r7 y7"));
        let expected = sorted(vec![GameSet::group(tiles("b7 r7 y7"))]);
        assert_eq!(sorted(catalog), expected);
    }

    #[test]
    fn test_duplicate_tiles_single_run() {
        // The second b1 instance adds no new run; the catalog keeps one.
        let catalog = enumerate_all_sets(&tiles("b1 b1 b2 b3"));
        assert_eq!(catalog, vec![GameSet::run(tiles("b1 b2 b3"))]);
    }

    #[test]
    fn test_interleaved_duplicates_still_yield_runs() {
        // Two full copies of every value: the run must still be found even
        // though the sorted bucket interleaves duplicates between the
        // consecutive numbers.
        let catalog = enumerate_all_sets(&tiles("r1 r1 r2 r2 r3 r3"));
        assert_eq!(catalog, vec![GameSet::run(tiles("r1 r2 r3"))]);

        let catalog = enumerate_all_sets(&tiles("r1 r1 r2 r2 r3 r3 r4"));
        let expected = sorted(vec![
            GameSet::run(tiles("r1 r2 r3")),
            GameSet::run(tiles("r1 r2 r3 r4")),
            GameSet::run(tiles("r2 r3 r4")),
        ]);
        assert_eq!(sorted(catalog), expected);
    }

    #[test]
    fn test_small_pools_yield_nothing() {
        assert!(enumerate_all_sets(&[]).is_empty());
        assert!(enumerate_all_sets(&tiles("r1 r2")).is_empty());
        // Buckets below 3 contribute nothing even in a larger pool
        assert!(enumerate_all_sets(&tiles("r1 r2 b5 y9")).is_empty());
    }

    #[test]
    fn test_order_independence() {
        let pool = tiles("r1 r2 r3 b3 y3 p3 b4 b5 b6");
        let mut shuffled = pool.clone();
        shuffled.reverse();
        shuffled.swap(0, 4);
        assert_eq!(
            sorted(enumerate_all_sets(&pool)),
            sorted(enumerate_all_sets(&shuffled))
        );
    }

    #[test]
    fn test_catalog_entries_are_valid_and_from_pool() {
        let pool = tiles("r1 r2 r3 r4 b4 y4 p4 b5 b6 b7");
        let pool_multiset = crate::TilePool::from_tiles(&pool);
        for set in enumerate_all_sets(&pool) {
            assert!(set.is_valid());
            assert!(pool_multiset.contains_set(&set));
        }
    }
}
