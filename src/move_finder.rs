//! Move selection: the playable hand subset with the most tiles wins.

use std::cmp::Reverse;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::solver::try_add_tiles;
use crate::{BoardState, Tile};

/// A successful move: the reworked board, what is left in the hand, and how
/// many tiles were played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub board: BoardState,
    pub remaining_hand: Vec<Tile>,
    pub tiles_played: usize,
}

/// Find the move that plays the most tiles from the hand.
///
/// Every non-empty hand subset is tried from largest to smallest, delegating
/// to the placement solver; the first success wins. Subsets of equal size are
/// tried in ascending bitmask order over the sorted hand, which makes the
/// tie-break deterministic. Returns `None` when no subset at all can be
/// played.
///
/// Hands of 64 tiles or more are reported as no move: subset enumeration is
/// 2^n and infeasible long before the u64 mask runs out of bits.
pub fn find_best_move(board: &BoardState, hand: &[Tile]) -> Option<Move> {
    if hand.is_empty() {
        return None;
    }
    if hand.len() >= 64 {
        warn!(
            "hand of {} tiles is too large to enumerate; reporting no move",
            hand.len()
        );
        return None;
    }

    let mut sorted_hand = hand.to_vec();
    sorted_hand.sort_unstable();
    let n = sorted_hand.len();

    let mut masks: Vec<u64> = (1..(1u64 << n)).collect();
    // Stable sort keeps the generation order within each cardinality.
    masks.sort_by_key(|mask| Reverse(mask.count_ones()));

    debug!("move search: hand of {n} tiles, {} subsets", masks.len());

    for mask in masks {
        let subset: Vec<Tile> = sorted_hand
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &tile)| tile)
            .collect();

        if let Some(new_board) = try_add_tiles(board, &subset) {
            let remaining_hand = remaining_after_playing(&sorted_hand, &subset);
            return Some(Move {
                board: new_board,
                remaining_hand,
                tiles_played: subset.len(),
            });
        }
    }

    None
}

/// Remove the played tiles from the hand one instance at a time, never by
/// value sweep: a hand with two r5s keeps one when one is played.
fn remaining_after_playing(hand: &[Tile], played: &[Tile]) -> Vec<Tile> {
    let mut remaining = hand.to_vec();
    for &tile in played {
        if let Some(position) = remaining.iter().position(|&t| t == tile) {
            remaining.remove(position);
        }
    }
    remaining
}
