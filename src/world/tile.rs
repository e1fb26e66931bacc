//! Tile definitions
//!
//! The legacy single-character tile alphabet shared by hand-authored layouts,
//! the level generator and the renderer.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Types of tiles in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Empty,
    Wall,
    Player,
    Monster,
    Gold,
    Exit,
    Trap,
    Chest,
    Door,
    Water,
    Lava,
}

impl TileType {
    pub const ALL: [TileType; 11] = [
        TileType::Empty,
        TileType::Wall,
        TileType::Player,
        TileType::Monster,
        TileType::Gold,
        TileType::Exit,
        TileType::Trap,
        TileType::Chest,
        TileType::Door,
        TileType::Water,
        TileType::Lava,
    ];

    /// Symbol written into grids for this tile
    pub const fn symbol(&self) -> char {
        match self {
            TileType::Empty => ' ',
            TileType::Wall => '#',
            TileType::Player => '@',
            TileType::Monster => 'M',
            TileType::Gold => '$',
            TileType::Exit => 'E',
            TileType::Trap => '^',
            TileType::Chest => '?',
            TileType::Door => '+',
            TileType::Water | TileType::Lava => '~',
        }
    }

    /// Decode a grid symbol
    ///
    /// `~` is shared by water and lava, so it resolves with a coin flip. Any
    /// symbol outside the alphabet (including `.`) is empty floor.
    pub fn from_symbol<R: Rng + ?Sized>(symbol: char, rng: &mut R) -> TileType {
        match symbol {
            '#' => TileType::Wall,
            '@' => TileType::Player,
            'E' => TileType::Exit,
            '$' => TileType::Gold,
            'M' | 'S' | 'Z' | 'W' => TileType::Monster,
            '?' => TileType::Chest,
            '^' => TileType::Trap,
            '+' => TileType::Door,
            '~' => {
                if rng.gen_bool(0.5) {
                    TileType::Water
                } else {
                    TileType::Lava
                }
            }
            _ => TileType::Empty,
        }
    }

    pub fn is_walkable(&self) -> bool {
        !matches!(self, TileType::Wall | TileType::Water | TileType::Lava)
    }

    pub fn description(&self) -> &'static str {
        match self {
            TileType::Empty => "An empty floor tile.",
            TileType::Wall => "A solid stone wall.",
            TileType::Player => "That's you!",
            TileType::Monster => "A dangerous monster.",
            TileType::Gold => "Shiny gold coins.",
            TileType::Exit => "An exit to the next level.",
            TileType::Trap => "A dangerous trap.",
            TileType::Chest => "A mysterious chest.",
            TileType::Door => "A door.",
            TileType::Water => "Deep water.",
            TileType::Lava => "Deadly lava.",
        }
    }

    pub fn fg_color(&self) -> (u8, u8, u8) {
        match self {
            TileType::Empty => (80, 80, 80),
            TileType::Wall => (102, 102, 102),
            TileType::Player => (0, 255, 255),
            TileType::Monster => (255, 0, 0),
            TileType::Gold => (255, 255, 0),
            TileType::Exit => (0, 255, 0),
            TileType::Trap => (255, 0, 255),
            TileType::Chest => (255, 170, 0),
            TileType::Door => (170, 85, 0),
            TileType::Water => (0, 0, 255),
            TileType::Lava => (255, 85, 0),
        }
    }

    pub fn bg_color(&self) -> Option<(u8, u8, u8)> {
        match self {
            TileType::Wall => Some((51, 51, 51)),
            TileType::Lava => Some((170, 0, 0)),
            _ => None,
        }
    }

    /// Drawn in bold
    pub fn is_emphasized(&self) -> bool {
        matches!(
            self,
            TileType::Player | TileType::Monster | TileType::Gold | TileType::Exit | TileType::Chest
        )
    }
}

/// Parse a `#rrggbb` color string
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_symbol() {
        let mut rng = StdRng::seed_from_u64(1);
        let cases = [
            (' ', TileType::Empty),
            ('.', TileType::Empty),
            ('#', TileType::Wall),
            ('@', TileType::Player),
            ('M', TileType::Monster),
            ('S', TileType::Monster),
            ('Z', TileType::Monster),
            ('W', TileType::Monster),
            ('$', TileType::Gold),
            ('E', TileType::Exit),
            ('^', TileType::Trap),
            ('?', TileType::Chest),
            ('+', TileType::Door),
            ('X', TileType::Empty),
        ];
        for (symbol, expected) in cases {
            assert_eq!(TileType::from_symbol(symbol, &mut rng), expected, "symbol {:?}", symbol);
        }
    }

    #[test]
    fn test_symbol_round_trip_except_liquids() {
        let mut rng = StdRng::seed_from_u64(2);
        for tile in TileType::ALL {
            let decoded = TileType::from_symbol(tile.symbol(), &mut rng);
            if matches!(tile, TileType::Water | TileType::Lava) {
                assert!(matches!(decoded, TileType::Water | TileType::Lava));
            } else {
                assert_eq!(decoded, tile);
            }
        }
    }

    #[test]
    fn test_liquid_symbol_yields_both_kinds() {
        let mut rng = StdRng::seed_from_u64(3);
        let decoded: Vec<_> = (0..200).map(|_| TileType::from_symbol('~', &mut rng)).collect();
        assert!(decoded.contains(&TileType::Water));
        assert!(decoded.contains(&TileType::Lava));
    }

    #[test]
    fn test_walkable() {
        assert!(!TileType::Wall.is_walkable());
        assert!(!TileType::Lava.is_walkable());
        assert!(TileType::Door.is_walkable());
        assert!(TileType::Empty.is_walkable());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffaa00"), Some((255, 170, 0)));
        assert_eq!(parse_hex_color("ffaa00"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
