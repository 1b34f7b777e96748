//! Map parsing functionality for converting raw maze text into tagged tiles.

use crate::error::ParseError;

/// Collectible kinds that can sit on a maze tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PelletKind {
    Normal,
    Power,
    Teleport,
    Invisibility,
    SpeedBoost,
    ScoreMagnet,
}

/// Tiles that become graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTile {
    /// A junction carrying a pellet (`+`).
    Junction,
    /// A junction without a pellet (`n`).
    Bare,
    /// `P`
    Power,
    /// `T` / `t`
    Teleport,
    /// `I` / `i`
    Invisibility,
    /// `S` / `s`
    SpeedBoost,
    /// `M` / `m`
    ScoreMagnet,
}

/// Tiles that connect two nodes without being nodes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTile {
    /// `.`
    Pellet,
    /// `p`
    Power,
    /// `-`
    Horizontal,
    /// `|`
    Vertical,
}

/// An enum representing the different types of tiles on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    Node(NodeTile),
    Path(PathTile),
    /// Anything else. Walls break node runs; the symbol is kept for debugging output.
    Wall(char),
}

impl MapTile {
    /// Resolves a maze symbol into its tile kind.
    pub fn from_symbol(symbol: char) -> MapTile {
        match symbol {
            '+' => MapTile::Node(NodeTile::Junction),
            'n' => MapTile::Node(NodeTile::Bare),
            'P' => MapTile::Node(NodeTile::Power),
            'T' | 't' => MapTile::Node(NodeTile::Teleport),
            'I' | 'i' => MapTile::Node(NodeTile::Invisibility),
            'S' | 's' => MapTile::Node(NodeTile::SpeedBoost),
            'M' | 'm' => MapTile::Node(NodeTile::ScoreMagnet),
            '.' => MapTile::Path(PathTile::Pellet),
            'p' => MapTile::Path(PathTile::Power),
            '-' => MapTile::Path(PathTile::Horizontal),
            '|' => MapTile::Path(PathTile::Vertical),
            other => MapTile::Wall(other),
        }
    }

    pub fn is_node(self) -> bool {
        matches!(self, MapTile::Node(_))
    }

    pub fn is_path(self) -> bool {
        matches!(self, MapTile::Path(_))
    }

    /// The collectible placed on this tile at level load, if any.
    pub fn pellet(self) -> Option<PelletKind> {
        match self {
            MapTile::Node(NodeTile::Junction) | MapTile::Path(PathTile::Pellet) => Some(PelletKind::Normal),
            MapTile::Node(NodeTile::Power) | MapTile::Path(PathTile::Power) => Some(PelletKind::Power),
            MapTile::Node(NodeTile::Teleport) => Some(PelletKind::Teleport),
            MapTile::Node(NodeTile::Invisibility) => Some(PelletKind::Invisibility),
            MapTile::Node(NodeTile::SpeedBoost) => Some(PelletKind::SpeedBoost),
            MapTile::Node(NodeTile::ScoreMagnet) => Some(PelletKind::ScoreMagnet),
            _ => None,
        }
    }
}

/// A rectangular grid of parsed tiles, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    tiles: Vec<MapTile>,
    rows: usize,
    cols: usize,
}

impl TileGrid {
    /// Parses maze text.
    ///
    /// Each non-blank line is one row. A line is either whitespace-separated single-character
    /// tokens (`X X + . +`) or one contiguous run of symbols (`+.+`).
    ///
    /// # Errors
    ///
    /// Returns an error if the text has no rows, a token is longer than one character,
    /// or the rows differ in length.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut tiles = Vec::new();
        let mut rows = 0;
        let mut cols = None;

        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let row = Self::parse_line(rows, line)?;
            let expected = *cols.get_or_insert(row.len());
            if row.len() != expected {
                return Err(ParseError::RaggedRow {
                    row: rows,
                    expected,
                    found: row.len(),
                });
            }
            tiles.extend(row);
            rows += 1;
        }

        match cols {
            Some(cols) if cols > 0 => Ok(Self { tiles, rows, cols }),
            _ => Err(ParseError::EmptyMaze),
        }
    }

    fn parse_line(row: usize, line: &str) -> Result<Vec<MapTile>, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if let [single] = tokens.as_slice() {
            return Ok(single.chars().map(MapTile::from_symbol).collect());
        }

        tokens
            .into_iter()
            .map(|token| {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(symbol), None) => Ok(MapTile::from_symbol(symbol)),
                    _ => Err(ParseError::InvalidToken {
                        row,
                        token: token.to_string(),
                    }),
                }
            })
            .collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the tile at the given column and row.
    pub fn get(&self, col: usize, row: usize) -> Option<MapTile> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.tiles.get(row * self.cols + col).copied()
    }

    /// Iterates every tile as `(col, row, tile)`, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, MapTile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(index, tile)| (index % self.cols, index / self.cols, *tile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_symbol_table() {
        assert_eq!(MapTile::from_symbol('+'), MapTile::Node(NodeTile::Junction));
        assert_eq!(MapTile::from_symbol('t'), MapTile::Node(NodeTile::Teleport));
        assert_eq!(MapTile::from_symbol('m'), MapTile::Node(NodeTile::ScoreMagnet));
        assert_eq!(MapTile::from_symbol('|'), MapTile::Path(PathTile::Vertical));
        assert_eq!(MapTile::from_symbol('X'), MapTile::Wall('X'));
        assert_eq!(MapTile::from_symbol('='), MapTile::Wall('='));
    }

    #[test]
    fn test_pellet_placement() {
        assert_eq!(MapTile::from_symbol('.').pellet(), Some(PelletKind::Normal));
        assert_eq!(MapTile::from_symbol('p').pellet(), Some(PelletKind::Power));
        assert_eq!(MapTile::from_symbol('S').pellet(), Some(PelletKind::SpeedBoost));
        assert_eq!(MapTile::from_symbol('n').pellet(), None);
        assert_eq!(MapTile::from_symbol('-').pellet(), None);
        assert_eq!(MapTile::from_symbol('X').pellet(), None);
    }

    #[test]
    fn test_both_line_forms_parse_identically() {
        let spaced = TileGrid::parse("+ . +\n+ . +\n").unwrap();
        let compact = TileGrid::parse("+.+\n+.+").unwrap();
        assert_eq!(spaced, compact);
        assert_eq!(spaced.rows(), 2);
        assert_eq!(spaced.cols(), 3);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let grid = TileGrid::parse("\n+.+\n\n+.+\n\n").unwrap();
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        assert_eq!(
            TileGrid::parse("+.+\n+.").unwrap_err(),
            ParseError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_empty_and_invalid_input() {
        assert_eq!(TileGrid::parse("").unwrap_err(), ParseError::EmptyMaze);
        assert_eq!(TileGrid::parse("  \n \n").unwrap_err(), ParseError::EmptyMaze);
        assert_eq!(
            TileGrid::parse("X XX X").unwrap_err(),
            ParseError::InvalidToken {
                row: 0,
                token: "XX".to_string()
            }
        );
    }

    #[test]
    fn test_get_and_iter() {
        let grid = TileGrid::parse("+.X\nn-+").unwrap();
        assert_eq!(grid.get(2, 0), Some(MapTile::Wall('X')));
        assert_eq!(grid.get(0, 1), Some(MapTile::Node(NodeTile::Bare)));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);

        let nodes: Vec<(usize, usize)> = grid
            .iter()
            .filter(|(_, _, tile)| tile.is_node())
            .map(|(col, row, _)| (col, row))
            .collect();
        assert_eq!(nodes, vec![(0, 0), (0, 1), (2, 1)]);
    }
}
