use rummy_solver::{BoardState, GameSet, Tile, enumerate_all_sets, find_best_move, try_add_tiles};

fn tiles(spec: &str) -> Vec<Tile> {
    spec.split_whitespace()
        .map(|s| s.parse().unwrap())
        .collect()
}

fn main() {
    println!("Rummy Solver\n");

    // A board with a red run and a yellow run
    let mut board = BoardState::new();
    assert!(board.add_set(GameSet::run(tiles("r1 r2 r3 r4"))));
    assert!(board.add_set(GameSet::run(tiles("y5 y6 y7"))));
    println!("Board:\n{}\n", board);

    // Catalog of everything constructible from the board's tiles
    let catalog = enumerate_all_sets(&board.all_tiles());
    println!("Catalog over the board pool ({} sets):", catalog.len());
    for set in &catalog {
        println!("  {}", set);
    }

    // Absorb two fours by splitting the red run
    let added = tiles("b4 p4");
    println!("\nAdding b4 and p4...");
    match try_add_tiles(&board, &added) {
        Some(new_board) => println!("Success:\n{}", new_board),
        None => println!("No valid placement."),
    }

    // Full move search over a hand
    let hand = tiles("b4 p4 y8 b13");
    print!("\nHand:");
    for tile in &hand {
        print!(" {}", tile);
    }
    println!();

    match find_best_move(&board, &hand) {
        Some(mv) => {
            println!("Best move plays {} tile(s):", mv.tiles_played);
            println!("{}", mv.board);
            if mv.remaining_hand.is_empty() {
                println!("Remaining hand: (empty - played all tiles!)");
            } else {
                print!("Remaining hand:");
                for tile in &mv.remaining_hand {
                    print!(" {}", tile);
                }
                println!();
            }
        }
        None => println!("No move possible."),
    }
}
