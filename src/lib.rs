use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod move_finder;
pub mod set_finder;
pub mod solver;

pub use move_finder::{Move, find_best_move};
pub use set_finder::enumerate_all_sets;
pub use solver::try_add_tiles;

/// Number of physical copies of each (color, number) tile in the deck.
pub const TILE_COPIES: u8 = 2;

/// The four tile colors. Ordered Blue < Purple < Red < Yellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Blue,
    Purple,
    Red,
    Yellow,
}

impl Color {
    fn from_char(c: char) -> Option<Color> {
        match c {
            'b' => Some(Color::Blue),
            'p' => Some(Color::Purple),
            'r' => Some(Color::Red),
            'y' => Some(Color::Yellow),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Color::Blue => 'b',
            Color::Purple => 'p',
            Color::Red => 'r',
            Color::Yellow => 'y',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A tile packed into a single byte.
/// - Bits 0-3: Number (1-13)
/// - Bits 4-5: Color (00 = Blue, 01 = Purple, 10 = Red, 11 = Yellow)
///
/// Color sits in the high bits so the derived ordering is color-major,
/// number-minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile(u8);

impl Tile {
    const NUMBER_MASK: u8 = 0b0000_1111;
    const COLOR_SHIFT: u8 = 4;

    /// Create a new tile. Panics on a number outside 1-13.
    pub fn new(color: Color, number: u8) -> Self {
        assert!((1..=13).contains(&number), "Number must be 1-13");
        Tile(((color as u8) << Self::COLOR_SHIFT) | number)
    }

    pub fn color(&self) -> Color {
        match self.0 >> Self::COLOR_SHIFT {
            0 => Color::Blue,
            1 => Color::Purple,
            2 => Color::Red,
            _ => Color::Yellow,
        }
    }

    pub fn number(&self) -> u8 {
        self.0 & Self::NUMBER_MASK
    }
}

impl FromStr for Tile {
    type Err = String;

    /// Parse a tile from its compact form: "b1" (blue 1), "p7" (purple 7),
    /// "r13" (red 13), "y9" (yellow 9).
    fn from_str(s: &str) -> Result<Self, String> {
        if s.len() < 2 {
            return Err(format!("Invalid tile string: {}", s));
        }

        let first = s.chars().next().unwrap();
        let color =
            Color::from_char(first).ok_or_else(|| format!("Invalid color: {}", first))?;

        let rest = &s[first.len_utf8()..];
        let number: u8 = rest
            .parse()
            .map_err(|_| format!("Invalid number: {}", rest))?;

        if !(1..=13).contains(&number) {
            return Err(format!("Number must be 1-13, got {}", number));
        }

        Ok(Tile::new(color, number))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color().as_char(), self.number())
    }
}

impl Serialize for Tile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Type of set in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetType {
    /// A run: consecutive numbers, same color
    Run,
    /// A group: same number, different colors
    Group,
}

/// A typed collection of tiles, kept in canonical sorted order.
///
/// Construction is permissive: a `GameSet` may hold contents that fail its
/// type's rules. Callers check `is_valid()` where correctness matters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "GameSetRepr")]
pub struct GameSet {
    set_type: SetType,
    tiles: Vec<Tile>,
}

#[derive(Deserialize)]
struct GameSetRepr {
    set_type: SetType,
    tiles: Vec<Tile>,
}

impl From<GameSetRepr> for GameSet {
    fn from(repr: GameSetRepr) -> Self {
        GameSet::new(repr.set_type, repr.tiles)
    }
}

impl GameSet {
    /// Create a new set. Tiles are sorted so two sets with the same multiset
    /// contents compare equal.
    pub fn new(set_type: SetType, mut tiles: Vec<Tile>) -> Self {
        tiles.sort_unstable();
        GameSet { set_type, tiles }
    }

    pub fn run(tiles: Vec<Tile>) -> Self {
        GameSet::new(SetType::Run, tiles)
    }

    pub fn group(tiles: Vec<Tile>) -> Self {
        GameSet::new(SetType::Group, tiles)
    }

    pub fn set_type(&self) -> SetType {
        self.set_type
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check this set against its type's rules. An empty set is never valid.
    pub fn is_valid(&self) -> bool {
        if self.tiles.is_empty() {
            return false;
        }
        match self.set_type {
            SetType::Run => is_valid_run(&self.tiles),
            SetType::Group => is_valid_group(&self.tiles),
        }
    }

    /// Parse a set from a string, auto-detecting type.
    /// Formats:
    /// - Group: "5 r b y" (number followed by color letters)
    /// - Run: "y 6 7 8" (color letter followed by numbers)
    pub fn from_string(input: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return Err("Empty set string".to_string());
        }

        // First token a number (1-13) → Group, a color letter → Run
        if let Ok(num) = tokens[0].parse::<u8>() {
            if (1..=13).contains(&num) {
                return Self::from_group_string(input);
            }
        }

        if tokens[0].len() == 1 && Color::from_char(tokens[0].chars().next().unwrap()).is_some() {
            return Self::from_run_string(input);
        }

        Err(format!(
            "Invalid set format: '{}'. Use 'N c1 c2 c3' for group or 'C n1 n2 n3' for run",
            input
        ))
    }

    /// Parse a group: "5 r b y" (number followed by color letters)
    pub fn from_group_string(input: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(format!(
                "Group must have at least 4 tokens (number + 3 colors), got: {}",
                tokens.len()
            ));
        }

        let number: u8 = tokens[0]
            .parse()
            .map_err(|_| format!("Invalid number: {}", tokens[0]))?;

        if !(1..=13).contains(&number) {
            return Err(format!("Number must be 1-13, got {}", number));
        }

        let mut tiles = Vec::new();
        for color_token in &tokens[1..] {
            let color = color_token
                .chars()
                .next()
                .filter(|_| color_token.len() == 1)
                .and_then(Color::from_char)
                .ok_or_else(|| format!("Invalid color: {}", color_token))?;
            tiles.push(Tile::new(color, number));
        }

        Ok(GameSet::group(tiles))
    }

    /// Parse a run: "y 6 7 8" (color letter followed by numbers)
    pub fn from_run_string(input: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(format!(
                "Run must have at least 4 tokens (color + 3 numbers), got: {}",
                tokens.len()
            ));
        }

        let color = tokens[0]
            .chars()
            .next()
            .filter(|_| tokens[0].len() == 1)
            .and_then(Color::from_char)
            .ok_or_else(|| format!("Invalid color: {}", tokens[0]))?;

        let mut tiles = Vec::new();
        for num_token in &tokens[1..] {
            let number: u8 = num_token
                .parse()
                .map_err(|_| format!("Invalid number: {}", num_token))?;

            if !(1..=13).contains(&number) {
                return Err(format!("Number must be 1-13, got {}", number));
            }

            tiles.push(Tile::new(color, number));
        }

        Ok(GameSet::run(tiles))
    }
}

impl fmt::Display for GameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:",
            match self.set_type {
                SetType::Run => "Run",
                SetType::Group => "Group",
            }
        )?;
        for tile in &self.tiles {
            write!(f, " {}", tile)?;
        }
        Ok(())
    }
}

// Validity helpers rely on the canonical sorted order GameSet maintains:
// color-major, number-minor.

fn is_valid_run(tiles: &[Tile]) -> bool {
    if tiles.len() < 3 {
        return false;
    }
    let color = tiles[0].color();
    let start = tiles[0].number();
    tiles
        .iter()
        .enumerate()
        .all(|(i, tile)| tile.color() == color && tile.number() == start + i as u8)
}

fn is_valid_group(tiles: &[Tile]) -> bool {
    if tiles.len() < 3 || tiles.len() > 4 {
        return false;
    }
    let number = tiles[0].number();
    if !tiles.iter().all(|tile| tile.number() == number) {
        return false;
    }
    // Equal numbers, so sorted order is color order: duplicates are adjacent.
    tiles.windows(2).all(|pair| pair[0].color() != pair[1].color())
}

/// A multiset of tiles, tracked with multiplicity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePool(BTreeMap<Tile, u8>);

impl TilePool {
    pub fn new() -> Self {
        TilePool(BTreeMap::new())
    }

    pub fn from_tiles(tiles: &[Tile]) -> Self {
        let mut pool = TilePool::new();
        for &tile in tiles {
            pool.add(tile);
        }
        pool
    }

    /// Add one instance of a tile to the pool
    pub fn add(&mut self, tile: Tile) {
        *self.0.entry(tile).or_insert(0) += 1;
    }

    /// Remove one instance of a tile. Returns false if none was present.
    pub fn remove(&mut self, tile: Tile) -> bool {
        if let Some(count) = self.0.get_mut(&tile) {
            *count -= 1;
            if *count == 0 {
                self.0.remove(&tile);
            }
            true
        } else {
            false
        }
    }

    /// Get the count of a specific tile
    pub fn count(&self, tile: Tile) -> u8 {
        self.0.get(&tile).copied().unwrap_or(0)
    }

    /// Total number of tile instances in the pool
    pub fn len(&self) -> usize {
        self.0.values().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tile, &u8)> {
        self.0.iter()
    }

    /// Expand the pool into a sorted list of tile instances
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(self.len());
        for (&tile, &count) in &self.0 {
            for _ in 0..count {
                tiles.push(tile);
            }
        }
        tiles
    }

    /// Check whether every tile mention in the set can consume a distinct
    /// instance from this pool.
    pub fn contains_set(&self, set: &GameSet) -> bool {
        let mut needed: BTreeMap<Tile, u8> = BTreeMap::new();
        for &tile in set.tiles() {
            *needed.entry(tile).or_insert(0) += 1;
        }
        needed.iter().all(|(&tile, &count)| self.count(tile) >= count)
    }

    /// Remove one instance per tile mention in the set
    pub fn remove_set(&mut self, set: &GameSet) {
        for &tile in set.tiles() {
            self.remove(tile);
        }
    }

    /// Restore one instance per tile mention in the set (backtracking)
    pub fn add_set(&mut self, set: &GameSet) {
        for &tile in set.tiles() {
            self.add(tile);
        }
    }
}

/// The board: an ordered collection of sets.
///
/// Every move produces a wholly new `BoardState`; the search never mutates
/// a board in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    sets: Vec<GameSet>,
}

impl BoardState {
    pub fn new() -> Self {
        BoardState { sets: Vec::new() }
    }

    pub fn from_sets(sets: Vec<GameSet>) -> Self {
        BoardState { sets }
    }

    /// Add a set to the board. An invalid set is refused and `false` is
    /// returned.
    pub fn add_set(&mut self, set: GameSet) -> bool {
        if set.is_valid() {
            self.sets.push(set);
            true
        } else {
            false
        }
    }

    pub fn sets(&self) -> &[GameSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// All tiles currently on the board, sorted
    pub fn all_tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self
            .sets
            .iter()
            .flat_map(|set| set.tiles().iter().copied())
            .collect();
        tiles.sort_unstable();
        tiles
    }

    /// Check that every set is individually valid and that no tile value
    /// appears across sets more often than the physical deck holds copies.
    pub fn is_valid(&self) -> bool {
        if !self.sets.iter().all(GameSet::is_valid) {
            return false;
        }
        let pool = TilePool::from_tiles(&self.all_tiles());
        pool.iter().all(|(_, &count)| count <= TILE_COPIES)
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sets.is_empty() {
            return write!(f, "Board is empty.");
        }
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "Set {}: {}", i + 1, set)?;
        }
        Ok(())
    }
}
