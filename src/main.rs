use std::io::Write;

use rummy_solver::{BoardState, GameSet, Move, Tile, find_best_move};

const USAGE: &str = "\
Usage: rummy-solver [OPTIONS] --hand \"<tiles>\"

Options:
  --set <SET>     A set already on the board; repeatable.
                  Group form: \"5 r b y\" (number then color letters)
                  Run form:   \"y 6 7 8\" (color letter then numbers)
  --hand <TILES>  The hand, as space-separated tiles, e.g. \"r4 b4 p4\"
  --json          Print the move as JSON instead of text
  -v, --verbose   Enable debug logging
  -h, --help      Show this help
";

struct Args {
    sets: Vec<String>,
    hand: Option<String>,
    json: bool,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        sets: Vec::new(),
        hand: None,
        json: false,
        verbose: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--set" => {
                let value = iter.next().ok_or("--set requires a value")?;
                args.sets.push(value);
            }
            "--hand" => {
                let value = iter.next().ok_or("--hand requires a value")?;
                args.hand = Some(value);
            }
            "--json" => args.json = true,
            "-v" | "--verbose" => args.verbose = true,
            "-h" | "--help" => {
                print!("{}", USAGE);
                std::process::exit(0);
            }
            other => return Err(format!("unrecognized argument: {}", other)),
        }
    }

    Ok(args)
}

fn init_logging(verbose: bool) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .chain(std::io::stderr())
        .apply()
        .ok();
}

fn run(args: Args) -> Result<(), String> {
    let hand_spec = args.hand.as_deref().ok_or("missing --hand")?;

    let mut board = BoardState::new();
    for set_spec in &args.sets {
        let set = GameSet::from_string(set_spec)?;
        if !board.add_set(set) {
            return Err(format!("invalid set: '{}'", set_spec));
        }
    }

    let hand: Vec<Tile> = hand_spec
        .split_whitespace()
        .map(|s| s.parse::<Tile>())
        .collect::<Result<_, _>>()?;

    match find_best_move(&board, &hand) {
        Some(mv) => {
            if args.json {
                let json = serde_json::to_string_pretty(&mv)
                    .map_err(|e| format!("failed to serialize move: {}", e))?;
                println!("{}", json);
            } else {
                print_move(&mv);
            }
        }
        None => {
            if args.json {
                println!("null");
            } else {
                println!("No move possible.");
            }
        }
    }

    Ok(())
}

fn print_move(mv: &Move) {
    println!("Played {} tile(s).", mv.tiles_played);
    println!("New board:");
    println!("{}", mv.board);
    if mv.remaining_hand.is_empty() {
        println!("Remaining hand: (empty)");
    } else {
        print!("Remaining hand:");
        for tile in &mv.remaining_hand {
            print!(" {}", tile);
        }
        println!();
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
