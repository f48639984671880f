//! Arena Map Index
//!
//! Static arena geometry. A literal glyph grid is classified once at
//! construction into walls and spawn points, expressed in arena-centered
//! coordinates: raw column/row minus half the width/height (integer
//! division), so `(0, 0)` is the visual center of the grid.

use std::collections::{BTreeMap, HashSet};
use serde::{Serialize, Deserialize};

use crate::core::coord::Coordinate;

/// Glyph for an impassable cell.
pub const WALL_GLYPH: char = '█';

/// ASCII alternative for a wall cell.
pub const WALL_GLYPH_ASCII: char = '#';

/// Glyph for a spawn point.
pub const SPAWN_GLYPH: char = 'S';

/// Classification of a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapType {
    /// Open floor
    None,
    /// Impassable
    Wall,
    /// Candidate respawn location (also open floor)
    Spawn,
}

impl MapType {
    /// Classify a glyph.
    pub fn from_glyph(glyph: char) -> Self {
        match glyph {
            WALL_GLYPH | WALL_GLYPH_ASCII => MapType::Wall,
            SPAWN_GLYPH => MapType::Spawn,
            _ => MapType::None,
        }
    }
}

/// Errors for malformed map assets. The engine refuses to start on any of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Grid has no rows, or its first row has no cells.
    #[error("Arena grid is empty")]
    Empty,

    /// A row's length differs from the first row's.
    #[error("Arena grid is not rectangular: row {row} has {found} cells, expected {expected}")]
    NotRectangular {
        /// Offending row index
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        found: usize,
    },

    /// No spawn glyph anywhere in the grid.
    #[error("Arena grid has no spawn points")]
    NoSpawnPoints,
}

/// Classified arena geometry.
#[derive(Clone, Debug)]
pub struct ArenaMap {
    rows: Vec<Vec<char>>,
    width: usize,
    height: usize,
    by_type: BTreeMap<MapType, Vec<Coordinate>>,
    walls: HashSet<Coordinate>,
}

impl ArenaMap {
    /// Build from rows of glyphs.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let rows: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();

        let width = rows.first().map(Vec::len).ok_or(MapError::Empty)?;
        if width == 0 {
            return Err(MapError::Empty);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(MapError::NotRectangular {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }
        let height = rows.len();

        let center_x = (width / 2) as i32;
        let center_y = (height / 2) as i32;

        // Row-major order: spawn points are consumed in this order
        let mut by_type: BTreeMap<MapType, Vec<Coordinate>> = BTreeMap::new();
        for (map_y, cells) in rows.iter().enumerate() {
            for (map_x, glyph) in cells.iter().enumerate() {
                let coord = Coordinate::new(map_x as i32 - center_x, map_y as i32 - center_y);
                by_type.entry(MapType::from_glyph(*glyph)).or_default().push(coord);
            }
        }

        if by_type.get(&MapType::Spawn).map_or(true, Vec::is_empty) {
            return Err(MapError::NoSpawnPoints);
        }

        let walls = by_type
            .get(&MapType::Wall)
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default();

        Ok(Self {
            rows,
            width,
            height,
            by_type,
            walls,
        })
    }

    /// Build from newline-separated text. Trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        Self::from_rows(&lines)
    }

    /// The standard 40x40 arena.
    pub fn default_arena() -> Result<Self, MapError> {
        Self::from_rows(DEFAULT_ARENA)
    }

    /// Grid size as (width, height).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// All coordinates sharing a classification, in row-major order.
    pub fn points(&self, map_type: MapType) -> &[Coordinate] {
        self.by_type.get(&map_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Full classification index.
    pub fn by_type(&self) -> &BTreeMap<MapType, Vec<Coordinate>> {
        &self.by_type
    }

    /// Spawn points in row-major order.
    pub fn spawn_points(&self) -> &[Coordinate] {
        self.points(MapType::Spawn)
    }

    /// Is this coordinate a wall?
    #[inline]
    pub fn is_wall(&self, coord: Coordinate) -> bool {
        self.walls.contains(&coord)
    }

    /// Is this coordinate inside the grid?
    pub fn contains(&self, coord: Coordinate) -> bool {
        self.raw_index(coord).is_some()
    }

    /// Classification of a coordinate, `None` when outside the grid.
    pub fn classify(&self, coord: Coordinate) -> Option<MapType> {
        self.glyph_at(coord).map(MapType::from_glyph)
    }

    /// Literal glyph at a coordinate.
    pub fn glyph_at(&self, coord: Coordinate) -> Option<char> {
        let (col, row) = self.raw_index(coord)?;
        Some(self.rows[row][col])
    }

    /// Convert a centered coordinate back to raw (column, row).
    pub fn raw_index(&self, coord: Coordinate) -> Option<(usize, usize)> {
        let col = coord.x + (self.width / 2) as i32;
        let row = coord.y + (self.height / 2) as i32;
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.width && row < self.height).then_some((col, row))
    }
}

/// The standard arena asset.
pub static DEFAULT_ARENA: &[&str] = &[
    "████████████████████████████████████████",
    "█                                      █",
    "█                                      █",
    "█  █  █                       ███████ S█",
    "█                   S               █  █",
    "█  S █                              █  █",
    "█                                   █  █",
    "█  █  █                             █  █",
    "█                                   █  █",
    "█    █                              █  █",
    "█                                      █",
    "█  █  █           █   █                █",
    "█                 █████                █",
    "█                                      █",
    "█                                      █",
    "█                          █           █",
    "█                          █           █",
    "█                          █S          █",
    "█                          █           █",
    "█                                      █",
    "█                   S                  █",
    "█                                      █",
    "█            █                         █",
    "█            █                         █",
    "█           S█                         █",
    "█            █                         █",
    "█  ████                                █",
    "█     █                                █",
    "█     █           █████                █",
    "█     █           █   █                █",
    "█     █                                █",
    "█     █                                █",
    "█  S  █                             S  █",
    "█     █                                █",
    "█     █                                █",
    "█     █             S                  █",
    "█     █                                █",
    "█                                      █",
    "█                                      █",
    "████████████████████████████████████████",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: usize) -> Vec<String> {
        (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| if row == 1 && col == 1 { 'S' } else { ' ' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_centering_40x40() {
        let map = ArenaMap::from_rows(&grid(40)).unwrap();
        assert_eq!(map.dimensions(), (40, 40));

        // Raw (0,0) -> (-20,-20); raw (20,20) -> (0,0)
        let open = map.points(MapType::None);
        assert_eq!(open[0], Coordinate::new(-20, -20));
        assert_eq!(map.raw_index(Coordinate::new(-20, -20)), Some((0, 0)));
        assert_eq!(map.raw_index(Coordinate::ORIGIN), Some((20, 20)));

        // Raw (1,1) is the spawn
        assert_eq!(map.spawn_points(), &[Coordinate::new(-19, -19)]);
    }

    #[test]
    fn test_odd_dimensions_center() {
        let map = ArenaMap::parse("#####\n#S  #\n#   #\n#   #\n#####\n").unwrap();
        assert_eq!(map.dimensions(), (5, 5));
        assert_eq!(map.spawn_points(), &[Coordinate::new(-1, -1)]);
        assert!(map.is_wall(Coordinate::new(-2, -2)));
        assert!(map.is_wall(Coordinate::new(2, 0)));
        assert!(!map.is_wall(Coordinate::ORIGIN));
        assert_eq!(map.points(MapType::Wall).len(), 16);
        assert_eq!(map.points(MapType::None).len(), 8);
    }

    #[test]
    fn test_contains_and_classify() {
        let map = ArenaMap::parse("#S#\n# #\n###").unwrap();
        assert!(map.contains(Coordinate::new(-1, -1)));
        assert!(map.contains(Coordinate::new(1, 1)));
        assert!(!map.contains(Coordinate::new(2, 0)));
        assert!(!map.contains(Coordinate::new(0, -2)));
        assert_eq!(map.classify(Coordinate::new(0, -1)), Some(MapType::Spawn));
        assert_eq!(map.classify(Coordinate::ORIGIN), Some(MapType::None));
        assert_eq!(map.classify(Coordinate::new(5, 5)), None);
    }

    #[test]
    fn test_default_arena() {
        let map = ArenaMap::default_arena().unwrap();
        assert_eq!(map.dimensions(), (40, 40));
        assert_eq!(map.spawn_points().len(), 9);
        // Row-major: the first spawn sits on row 3
        assert_eq!(map.spawn_points()[0], Coordinate::new(18, -17));
        assert!(map.spawn_points().contains(&Coordinate::ORIGIN));
        // Border is solid
        assert!(map.is_wall(Coordinate::new(-20, -20)));
        assert!(map.is_wall(Coordinate::new(19, 19)));
        for spawn in map.spawn_points() {
            assert!(!map.is_wall(*spawn));
        }
    }

    #[test]
    fn test_malformed_grids() {
        let empty: [&str; 0] = [];
        assert_eq!(ArenaMap::from_rows(&empty).unwrap_err(), MapError::Empty);
        assert_eq!(ArenaMap::from_rows(&[""]).unwrap_err(), MapError::Empty);
        assert_eq!(ArenaMap::parse("").unwrap_err(), MapError::Empty);

        let err = ArenaMap::from_rows(&["S  ", "  ", "   "]).unwrap_err();
        assert_eq!(
            err,
            MapError::NotRectangular { row: 1, expected: 3, found: 2 }
        );

        assert_eq!(
            ArenaMap::from_rows(&["###", "# #", "###"]).unwrap_err(),
            MapError::NoSpawnPoints
        );
    }
}
