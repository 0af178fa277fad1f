//! Read-only world model supplied by the world loader.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biome of a tile. Unrecognised keys deserialize to [`Biome::Unknown`],
/// which every lookup table maps to its default entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Plains,
    Forest,
    Desert,
    Tropical,
    Tundra,
    Mountains,
    VolcanicRim,
    Coast,
    Beach,
    Wetlands,
    Bog,
    #[serde(other)]
    Unknown,
}

impl Biome {
    pub const ALL: [Self; 11] = [
        Self::Plains,
        Self::Forest,
        Self::Desert,
        Self::Tropical,
        Self::Tundra,
        Self::Mountains,
        Self::VolcanicRim,
        Self::Coast,
        Self::Beach,
        Self::Wetlands,
        Self::Bog,
    ];

    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Desert => "desert",
            Self::Tropical => "tropical",
            Self::Tundra => "tundra",
            Self::Mountains => "mountains",
            Self::VolcanicRim => "volcanic_rim",
            Self::Coast => "coast",
            Self::Beach => "beach",
            Self::Wetlands => "wetlands",
            Self::Bog => "bog",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a biome key; anything unrecognised becomes `Unknown`.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|biome| key.eq_ignore_ascii_case(biome.as_key()))
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Kind of tile; settlements and slice entrances are distinguished here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    #[default]
    Terrain,
    Town,
    Port,
    Ruins,
    Dungeon,
    DenseForest,
    Cave,
    VolcanicRim,
    #[serde(other)]
    Unknown,
}

impl TileType {
    pub const ALL: [Self; 8] = [
        Self::Terrain,
        Self::Town,
        Self::Port,
        Self::Ruins,
        Self::Dungeon,
        Self::DenseForest,
        Self::Cave,
        Self::VolcanicRim,
    ];

    /// Towns and ports count as safe settlements.
    #[must_use]
    pub const fn is_settlement(self) -> bool {
        matches!(self, Self::Town | Self::Port)
    }

    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Town => "town",
            Self::Port => "port",
            Self::Ruins => "ruins",
            Self::Dungeon => "dungeon",
            Self::DenseForest => "dense_forest",
            Self::Cave => "cave",
            Self::VolcanicRim => "volcanic_rim",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| key.eq_ignore_ascii_case(kind.as_key()))
            .unwrap_or(Self::Unknown)
    }
}

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TileRecord {
    #[serde(default)]
    pub biome: Biome,
    #[serde(default, rename = "tileType", alias = "tile_type")]
    pub tile_type: TileType,
}

impl TileRecord {
    #[must_use]
    pub const fn new(biome: Biome, tile_type: TileType) -> Self {
        Self { biome, tile_type }
    }
}

/// One shard's grid as handed over by the world provider. Rows are indexed
/// `tiles[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(rename = "worldSeed", alias = "world_seed")]
    pub world_seed: u32,
    #[serde(rename = "shardId", alias = "shard_id")]
    pub shard_id: String,
    pub width: i32,
    pub height: i32,
    pub spawn: TilePos,
    pub tiles: Vec<Vec<TileRecord>>,
}

impl WorldSnapshot {
    /// Grid of `width × height` copies of `fill`.
    #[must_use]
    pub fn filled(
        world_seed: u32,
        shard_id: impl Into<String>,
        width: i32,
        height: i32,
        spawn: TilePos,
        fill: TileRecord,
    ) -> Self {
        let columns = usize::try_from(width.max(0)).unwrap_or(0);
        let rows = usize::try_from(height.max(0)).unwrap_or(0);
        Self {
            world_seed,
            shard_id: shard_id.into(),
            width,
            height,
            spawn,
            tiles: vec![vec![fill; columns]; rows],
        }
    }

    /// Load a snapshot from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<&TileRecord> {
        if !self.contains(pos) {
            return None;
        }
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        self.tiles.get(y)?.get(x)
    }

    /// Replace one tile; positions outside the grid are ignored.
    pub fn set_tile(&mut self, pos: TilePos, record: TileRecord) {
        if !self.contains(pos) {
            return;
        }
        let (Ok(x), Ok(y)) = (usize::try_from(pos.x), usize::try_from(pos.y)) else {
            return;
        };
        if let Some(slot) = self.tiles.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = record;
        }
    }

    /// Every present tile in row-major order.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (TilePos, &TileRecord)> {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, record)| {
                let pos = TilePos::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?);
                Some((pos, record))
            })
        })
    }
}
