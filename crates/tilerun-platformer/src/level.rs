use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use tilerun_core::geometry::{Rect, Vec2};

use crate::error::PlatformerError;

/// Tile edge length in world pixels.
pub const CELL: f32 = 16.0;
/// Tile id marking a collision cell in exported tile layers.
pub const COLLISION_TILE_ID: u32 = 202;
/// Width of generated levels, in tiles.
pub const TILES_PER_ROW: u32 = 36;
/// Height of generated levels, in tiles.
const GENERATED_ROWS: u32 = 27;
/// Columns kept flat around the spawn point in generated levels.
const SPAWN_COLUMNS: u32 = 12;
/// Columns per procedural section.
const CHUNK_WIDTH: u32 = 6;
/// Default spawn point (top-left of the player body).
pub const SPAWN: Vec2 = Vec2::new(100.0, 50.0);

/// Which collection a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Blocks motion from every direction.
    Floor,
    /// One-way: only stops downward motion onto its top edge.
    Platform,
}

/// Non-owning reference to a block inside a [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub kind: BlockKind,
    pub index: usize,
}

/// Immutable axis-aligned collision rectangle in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBlock {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CollisionBlock {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(self.x, self.y, self.width, self.height)
    }

    fn check(&self) -> Result<(), String> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err("non-finite coordinate".to_string());
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(format!("negative size {}x{}", self.width, self.height));
        }
        Ok(())
    }
}

/// Collision world for one level. Block order is creation order and is
/// significant: collision scans stop at the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub floor: Vec<CollisionBlock>,
    pub platforms: Vec<CollisionBlock>,
    pub spawn: Vec2,
    /// World width in pixels.
    pub width: f32,
    /// World height in pixels.
    pub height: f32,
    /// Reaching this region wins the session.
    pub goal: Option<CollisionBlock>,
}

impl Level {
    pub fn new(
        floor: Vec<CollisionBlock>,
        platforms: Vec<CollisionBlock>,
        spawn: Vec2,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            floor,
            platforms,
            spawn,
            width,
            height,
            goal: None,
        }
    }

    pub fn with_goal(mut self, goal: CollisionBlock) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn blocks(&self, kind: BlockKind) -> &[CollisionBlock] {
        match kind {
            BlockKind::Floor => &self.floor,
            BlockKind::Platform => &self.platforms,
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&CollisionBlock> {
        self.blocks(id.kind).get(id.index)
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Reject geometry the simulation cannot reason about.
    pub fn validate(&self) -> Result<(), PlatformerError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(PlatformerError::InvalidLevel(format!(
                "world size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if !self.spawn.is_finite() {
            return Err(PlatformerError::InvalidLevel(
                "spawn point must be finite".to_string(),
            ));
        }
        for kind in [BlockKind::Floor, BlockKind::Platform] {
            for (index, block) in self.blocks(kind).iter().enumerate() {
                block
                    .check()
                    .map_err(|reason| PlatformerError::InvalidBlock {
                        kind,
                        index,
                        reason,
                    })?;
            }
        }
        if let Some(goal) = &self.goal {
            goal.check()
                .map_err(|reason| PlatformerError::InvalidLevel(format!("goal: {reason}")))?;
        }
        Ok(())
    }

    /// Build a level from floor and platform tile layers. Floor tiles become
    /// full cells, platform tiles half-height cells.
    pub fn from_tiles(tiles: &TileLayers, spawn: Vec2) -> Self {
        let floor = tile_positions(&tiles.floor, tiles.tiles_per_row, &tiles.tile_ids, tiles.cell)
            .into_iter()
            .map(|p| CollisionBlock::new(p.x, p.y, tiles.cell, tiles.cell))
            .collect();
        let platforms = tile_positions(
            &tiles.platforms,
            tiles.tiles_per_row,
            &tiles.tile_ids,
            tiles.cell,
        )
        .into_iter()
        .map(|p| CollisionBlock::new(p.x, p.y, tiles.cell, tiles.cell / 2.0))
        .collect();
        let size = tiles.world_size();
        Self::new(floor, platforms, spawn, size.x, size.y)
    }

    /// Parse a level from TOML text. `origin` names the source in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, PlatformerError> {
        let file: LevelFile = toml::from_str(content).map_err(|e| PlatformerError::LevelParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        let level = file.into_level()?;
        level.validate()?;
        Ok(level)
    }

    /// Read and parse a level file.
    pub fn load(path: &str) -> Result<Self, PlatformerError> {
        let content = std::fs::read_to_string(path).map_err(|source| PlatformerError::LevelIo {
            path: path.to_string(),
            source,
        })?;
        let level = Self::from_toml_str(&content, path)?;
        tracing::debug!(
            path,
            floor = level.floor.len(),
            platforms = level.platforms.len(),
            "Loaded level"
        );
        Ok(level)
    }
}

/// Row-major tile-id layers sharing one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayers {
    #[serde(default = "default_cell")]
    pub cell: f32,
    #[serde(default = "default_tiles_per_row")]
    pub tiles_per_row: u32,
    /// Tile ids that mark a collision cell.
    #[serde(default = "default_tile_ids")]
    pub tile_ids: Vec<u32>,
    #[serde(default)]
    pub floor: Vec<u32>,
    #[serde(default)]
    pub platforms: Vec<u32>,
}

fn default_cell() -> f32 {
    CELL
}

fn default_tiles_per_row() -> u32 {
    TILES_PER_ROW
}

fn default_tile_ids() -> Vec<u32> {
    vec![COLLISION_TILE_ID]
}

impl TileLayers {
    pub fn rows(&self) -> u32 {
        if self.tiles_per_row == 0 {
            return 0;
        }
        let len = self.floor.len().max(self.platforms.len()) as u32;
        len.div_ceil(self.tiles_per_row)
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.tiles_per_row as f32 * self.cell,
            self.rows() as f32 * self.cell,
        )
    }
}

/// Top-left world positions of every tile in `layer` whose id is listed in
/// `tile_ids`, in layer order.
pub fn tile_positions(layer: &[u32], tiles_per_row: u32, tile_ids: &[u32], cell: f32) -> Vec<Vec2> {
    if tiles_per_row == 0 {
        return Vec::new();
    }
    layer
        .iter()
        .enumerate()
        .filter(|(_, id)| tile_ids.contains(id))
        .map(|(i, _)| {
            let col = i as u32 % tiles_per_row;
            let row = i as u32 / tiles_per_row;
            Vec2::new(col as f32 * cell, row as f32 * cell)
        })
        .collect()
}

/// On-disk level format. Explicit blocks come first, then tile-derived ones.
#[derive(Debug, Deserialize)]
struct LevelFile {
    width: Option<f32>,
    height: Option<f32>,
    spawn: Option<Vec2>,
    goal: Option<CollisionBlock>,
    #[serde(default)]
    floor: Vec<CollisionBlock>,
    #[serde(default)]
    platforms: Vec<CollisionBlock>,
    tiles: Option<TileLayers>,
}

impl LevelFile {
    fn into_level(self) -> Result<Level, PlatformerError> {
        let spawn = self.spawn.unwrap_or(SPAWN);
        let mut level = Level::new(self.floor, self.platforms, spawn, 0.0, 0.0);
        let mut derived = Vec2::ZERO;

        if let Some(tiles) = &self.tiles {
            if tiles.tiles_per_row == 0 {
                return Err(PlatformerError::InvalidLevel(
                    "tiles_per_row must be positive".to_string(),
                ));
            }
            let tiled = Level::from_tiles(tiles, spawn);
            level.floor.extend(tiled.floor);
            level.platforms.extend(tiled.platforms);
            derived = tiles.world_size();
        }

        // Without explicit or tile-derived extents, the world ends at the
        // furthest block edge.
        for block in level.floor.iter().chain(&level.platforms) {
            derived.x = derived.x.max(block.x + block.width);
            derived.y = derived.y.max(block.y + block.height);
        }

        level.width = self.width.unwrap_or(derived.x);
        level.height = self.height.unwrap_or(derived.y);
        level.goal = self.goal;
        Ok(level)
    }
}

/// Generate a deterministic demo level from a seed.
///
/// Ground fills the bottom two rows; the spawn area is flat and the last
/// section holds the goal. Sections in between are picked at random.
pub fn generate_level(seed: u64) -> Level {
    let cols = TILES_PER_ROW;
    let rows = GENERATED_ROWS;
    let mut tiles = TileLayers {
        cell: CELL,
        tiles_per_row: cols,
        tile_ids: vec![COLLISION_TILE_ID],
        floor: vec![0; (cols * rows) as usize],
        platforms: vec![0; (cols * rows) as usize],
    };
    let ground = rows - 2;

    let mut rng = StdRng::seed_from_u64(seed);

    for x in 0..cols {
        set_tile(&mut tiles.floor, cols, x, ground);
        set_tile(&mut tiles.floor, cols, x, ground + 1);
    }

    let mut base_x = SPAWN_COLUMNS;
    while base_x + CHUNK_WIDTH < cols {
        generate_chunk(&mut tiles, &mut rng, base_x, ground);
        base_x += CHUNK_WIDTH;
    }

    let goal_x = (cols - 2) as f32 * CELL;
    let goal_y = (ground - 2) as f32 * CELL;
    let goal = CollisionBlock::new(goal_x, goal_y, CELL, CELL * 2.0);
    Level::from_tiles(&tiles, SPAWN).with_goal(goal)
}

fn set_tile(layer: &mut [u32], cols: u32, x: u32, y: u32) {
    if let Some(slot) = layer.get_mut((y * cols + x) as usize) {
        *slot = COLLISION_TILE_ID;
    }
}

fn generate_chunk(tiles: &mut TileLayers, rng: &mut StdRng, base_x: u32, ground: u32) {
    let cols = tiles.tiles_per_row;
    match rng.random_range(0u8..4) {
        0 => {
            // Raised one-way platforms
            let plat_y = ground - rng.random_range(3u32..5);
            let plat_start = base_x + rng.random_range(0..2);
            let plat_len = rng.random_range(3..5);
            for x in plat_start..(plat_start + plat_len).min(cols) {
                set_tile(&mut tiles.platforms, cols, x, plat_y);
            }
        },
        1 => {
            // Staircase going up
            for i in 0..3u32 {
                let x = base_x + i * 2;
                for step in 0..=i {
                    set_tile(&mut tiles.floor, cols, x, ground - 1 - step);
                    set_tile(&mut tiles.floor, cols, x + 1, ground - 1 - step);
                }
            }
        },
        2 => {
            // Low wall
            let wall_x = base_x + CHUNK_WIDTH / 2;
            let wall_h = rng.random_range(1u32..3);
            for dy in 0..wall_h {
                set_tile(&mut tiles.floor, cols, wall_x, ground - 1 - dy);
            }
        },
        _ => {
            // Floating ledge
            let ledge_y = ground - rng.random_range(3u32..5);
            let ledge_x = base_x + rng.random_range(1..3);
            for x in ledge_x..ledge_x + 2 {
                set_tile(&mut tiles.floor, cols, x, ledge_y);
            }
        },
    }
}
