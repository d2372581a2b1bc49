//! Exact-partition backtracking: rework the board so that a batch of new
//! tiles is absorbed into valid sets.

use log::{debug, warn};

use crate::set_finder::enumerate_all_sets;
use crate::{BoardState, GameSet, Tile, TilePool};

/// Try to incorporate `tiles_to_add` into the board, dissolving and reforming
/// existing sets as needed.
///
/// Succeeds iff the combined pool (board tiles plus `tiles_to_add`) admits a
/// full partition into valid sets. Returns the first witnessing board found
/// in depth-first catalog order, or `None` if no partition exists. The input
/// board is never touched; failure leaves no observable state behind.
///
/// Adding an empty batch always fails: playing nothing is not a move.
pub fn try_add_tiles(board: &BoardState, tiles_to_add: &[Tile]) -> Option<BoardState> {
    if tiles_to_add.is_empty() {
        return None;
    }

    let mut combined = TilePool::from_tiles(&board.all_tiles());
    for &tile in tiles_to_add {
        combined.add(tile);
    }

    // One catalog over the combined pool serves the whole search.
    let catalog = enumerate_all_sets(&combined.tiles());
    debug!(
        "placement search: pool of {} tiles, catalog of {} sets, {} required",
        combined.len(),
        catalog.len(),
        tiles_to_add.len()
    );

    let total_tiles = combined.len();
    let mut pool = combined.clone();
    let mut uncovered = TilePool::from_tiles(tiles_to_add);
    let mut chosen: Vec<GameSet> = Vec::new();

    if !search(&catalog, 0, &mut pool, &mut uncovered, &mut chosen, 0, total_tiles) {
        return None;
    }

    validate_result(chosen, &combined, tiles_to_add)
}

/// Depth-first search for a full partition of the remaining pool.
///
/// Candidates are tried in catalog order starting at `start`; recursing at
/// the same index lets a value-identical set be committed twice when the pool
/// holds duplicate instances, while never re-exploring permutations of the
/// same partition. Every commit (pool removal, coverage marking, accumulator
/// push) is undone exactly once on the backtrack path.
#[allow(clippy::too_many_arguments)]
fn search(
    catalog: &[GameSet],
    start: usize,
    pool: &mut TilePool,
    uncovered: &mut TilePool,
    chosen: &mut Vec<GameSet>,
    placed: usize,
    total_tiles: usize,
) -> bool {
    if pool.is_empty() {
        // Full partition reached; it counts only if every required tile
        // instance was consumed along the way.
        return uncovered.is_empty();
    }

    if placed > total_tiles {
        // Unreachable with correct bookkeeping.
        debug_assert!(false, "committed {placed} tiles against a pool of {total_tiles}");
        warn!("placement search overcommitted ({placed} > {total_tiles}); abandoning branch");
        return false;
    }

    for index in start..catalog.len() {
        let candidate = &catalog[index];
        if !pool.contains_set(candidate) {
            continue;
        }

        // Commit: consume the tiles, mark newly covered required instances,
        // record the set.
        pool.remove_set(candidate);
        let mut newly_covered = Vec::new();
        for &tile in candidate.tiles() {
            if uncovered.remove(tile) {
                newly_covered.push(tile);
            }
        }
        chosen.push(candidate.clone());

        if search(
            catalog,
            index,
            pool,
            uncovered,
            chosen,
            placed + candidate.len(),
            total_tiles,
        ) {
            return true;
        }

        // Backtrack: undo the three commit effects.
        chosen.pop();
        for &tile in &newly_covered {
            uncovered.add(tile);
        }
        pool.add_set(candidate);
    }

    false
}

/// Mandatory pre-success re-check: the partition must reassemble into a valid
/// board whose tile multiset equals the combined pool, with every added tile
/// present.
fn validate_result(
    chosen: Vec<GameSet>,
    combined: &TilePool,
    tiles_to_add: &[Tile],
) -> Option<BoardState> {
    let mut board = BoardState::new();
    for set in chosen {
        if !board.add_set(set) {
            debug_assert!(false, "search committed an invalid set");
            warn!("placement search produced an invalid set; rejecting result");
            return None;
        }
    }

    if !board.is_valid() {
        // Reachable when the caller's inputs hold more copies of a value
        // than the physical deck; not a bookkeeping failure.
        warn!("placement result is not a valid board; rejecting result");
        return None;
    }

    let result_pool = TilePool::from_tiles(&board.all_tiles());
    if result_pool != *combined {
        debug_assert!(false, "result tiles diverge from the combined pool");
        warn!("placement result does not conserve the tile pool; rejecting result");
        return None;
    }

    let required = TilePool::from_tiles(tiles_to_add);
    for (&tile, &count) in required.iter() {
        if result_pool.count(tile) < count {
            debug_assert!(false, "required tile {tile} missing from result");
            warn!("placement result dropped required tile {tile}; rejecting result");
            return None;
        }
    }

    Some(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameSet;

    fn tile(s: &str) -> Tile {
        s.parse().unwrap()
    }

    fn tiles(spec: &str) -> Vec<Tile> {
        spec.split_whitespace().map(tile).collect()
    }

    fn sorted_sets(board: &BoardState) -> Vec<GameSet> {
        let mut sets = board.sets().to_vec();
        sets.sort_unstable();
        sets
    }

    fn assert_boards_equivalent(actual: &BoardState, expected: &BoardState) {
        assert_eq!(sorted_sets(actual), sorted_sets(expected));
    }

    #[test]
    fn test_new_run_on_empty_board() {
        let board = BoardState::new();
        let result = try_add_tiles(&board, &tiles("r1 r2 r3")).unwrap();

        let mut expected = BoardState::new();
        assert!(expected.add_set(GameSet::run(tiles("r1 r2 r3"))));
        assert_boards_equivalent(&result, &expected);
    }

    #[test]
    fn test_unplayable_tiles_fail() {
        let board = BoardState::new();
        assert!(try_add_tiles(&board, &tiles("r1 r2")).is_none());
    }

    #[test]
    fn test_empty_add_always_fails() {
        assert!(try_add_tiles(&BoardState::new(), &[]).is_none());

        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("b1 b2 b3"))));
        assert!(try_add_tiles(&board, &[]).is_none());
    }

    #[test]
    fn test_independent_set_added_alongside() {
        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("b1 b2 b3"))));

        let result = try_add_tiles(&board, &tiles("r1 r2 r3")).unwrap();

        let mut expected = BoardState::new();
        assert!(expected.add_set(GameSet::run(tiles("b1 b2 b3"))));
        assert!(expected.add_set(GameSet::run(tiles("r1 r2 r3"))));
        assert_boards_equivalent(&result, &expected);
    }

    #[test]
    fn test_extend_existing_run() {
        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("r1 r2 r3"))));

        let result = try_add_tiles(&board, &tiles("r4")).unwrap();

        let mut expected = BoardState::new();
        assert!(expected.add_set(GameSet::run(tiles("r1 r2 r3 r4"))));
        assert_boards_equivalent(&result, &expected);
    }

    #[test]
    fn test_break_and_reform() {
        // Board: r1-r4 run and y5-y7 run. Adding b4 and p4 forces the red
        // run to give up r4 for a group of fours.
        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("r1 r2 r3 r4"))));
        assert!(board.add_set(GameSet::run(tiles("y5 y6 y7"))));

        let result = try_add_tiles(&board, &tiles("b4 p4")).unwrap();

        let mut expected = BoardState::new();
        assert!(expected.add_set(GameSet::run(tiles("r1 r2 r3"))));
        assert!(expected.add_set(GameSet::group(tiles("r4 b4 p4"))));
        assert!(expected.add_set(GameSet::run(tiles("y5 y6 y7"))));
        assert_boards_equivalent(&result, &expected);
    }

    #[test]
    fn test_duplicate_instances_partition_into_twin_sets() {
        // Two full copies of r1 r2 r3 need the same catalog entry twice.
        let board = BoardState::new();
        let result = try_add_tiles(&board, &tiles("r1 r1 r2 r2 r3 r3")).unwrap();

        let run = GameSet::run(tiles("r1 r2 r3"));
        assert_eq!(sorted_sets(&result), vec![run.clone(), run]);
    }

    #[test]
    fn test_pool_beyond_deck_fails_cleanly() {
        // The board already holds both physical copies of r1-r3. A third
        // copy from the caller can be partitioned into runs, but the result
        // can never be a legal board; the add fails without panicking.
        let run = GameSet::run(tiles("r1 r2 r3"));
        let board = BoardState::from_sets(vec![run.clone(), run]);
        assert!(board.is_valid());

        assert!(try_add_tiles(&board, &tiles("r1 r2 r3")).is_none());
    }

    #[test]
    fn test_failure_leaves_board_untouched() {
        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("b1 b2 b3"))));
        let snapshot = board.clone();

        // y13 cannot join anything
        assert!(try_add_tiles(&board, &tiles("y13")).is_none());
        assert_eq!(board, snapshot);
    }

    #[test]
    fn test_result_conserves_tile_multiset() {
        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("r1 r2 r3 r4"))));
        assert!(board.add_set(GameSet::group(tiles("b9 r9 y9"))));

        let added = tiles("r5 r6");
        let result = try_add_tiles(&board, &added).unwrap();
        assert!(result.is_valid());

        let mut expected_tiles = board.all_tiles();
        expected_tiles.extend_from_slice(&added);
        expected_tiles.sort_unstable();
        assert_eq!(result.all_tiles(), expected_tiles);
    }

    #[test]
    fn test_partition_must_use_whole_pool() {
        // b4 alone could extend nothing: the blue run cannot absorb it
        // (b1 b2 b3 b4 works), but pairing it with a leftover is impossible.
        // Here the add succeeds only because the whole pool re-partitions.
        let mut board = BoardState::new();
        assert!(board.add_set(GameSet::run(tiles("b1 b2 b3"))));
        let result = try_add_tiles(&board, &tiles("b4")).unwrap();

        let mut expected = BoardState::new();
        assert!(expected.add_set(GameSet::run(tiles("b1 b2 b3 b4"))));
        assert_boards_equivalent(&result, &expected);

        // A tile that would strand the remainder of the pool fails outright.
        assert!(try_add_tiles(&board, &tiles("b5 b7")).is_none());
    }
}
