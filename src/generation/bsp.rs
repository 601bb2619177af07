//! # BSP Generation
//!
//! Binary space partitioning layout. The map is split recursively into two
//! regions at a time, every leaf region receives one room, and on the way
//! back up each split joins the closest pair of rooms on its two sides.
//! Since every split adds exactly one connector between two already
//! connected halves, the finished tree is connected.

use crate::game::TileGrid;
use crate::generation::{utils, GenerationConfig, Generator, Room};
use crate::{BreakdownError, BreakdownResult};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Axis-aligned region of the map, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// How a node divides its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Cut along a column: `left` is west of `right`
    Vertical,
    /// Cut along a row: `left` is north of `right`
    Horizontal,
}

/// Node of the partition tree.
#[derive(Debug, Clone)]
pub struct BspNode {
    pub region: Region,
    pub split: Option<Split>,
    pub left: Option<Box<BspNode>>,
    pub right: Option<Box<BspNode>>,
}

impl BspNode {
    fn leaf(region: Region) -> Self {
        Self {
            region,
            split: None,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => left.leaf_count() + right.leaf_count(),
            _ => 1,
        }
    }
}

/// BSP layout generator.
#[derive(Debug, Clone, Default)]
pub struct BspGenerator;

impl BspGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Splits `region` until `depth` runs out or a further cut would leave a
    /// side narrower than the minimum leaf size.
    pub fn partition(
        &self,
        region: Region,
        depth: u32,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> BspNode {
        let min_leaf = config.room_min_size + 1;
        if depth == 0 {
            return BspNode::leaf(region);
        }

        let can_vertical = region.w >= 2 * min_leaf;
        let can_horizontal = region.h >= 2 * min_leaf;
        let split = match (can_vertical, can_horizontal) {
            (false, false) => return BspNode::leaf(region),
            (true, false) => Split::Vertical,
            (false, true) => Split::Horizontal,
            (true, true) => {
                let (w, h) = (region.w as f64, region.h as f64);
                if w / h > 1.5 {
                    Split::Vertical
                } else if h / w > 1.5 {
                    Split::Horizontal
                } else if rng.gen_bool(0.5) {
                    Split::Vertical
                } else {
                    Split::Horizontal
                }
            }
        };

        let (first, second) = match split {
            Split::Vertical => {
                let at = rng.gen_range(min_leaf..=region.w - min_leaf);
                (
                    Region { w: at, ..region },
                    Region {
                        x: region.x + at,
                        w: region.w - at,
                        ..region
                    },
                )
            }
            Split::Horizontal => {
                let at = rng.gen_range(min_leaf..=region.h - min_leaf);
                (
                    Region { h: at, ..region },
                    Region {
                        y: region.y + at,
                        h: region.h - at,
                        ..region
                    },
                )
            }
        };

        BspNode {
            region,
            split: Some(split),
            left: Some(Box::new(self.partition(first, depth - 1, config, rng))),
            right: Some(Box::new(self.partition(second, depth - 1, config, rng))),
        }
    }

    /// Outer rectangle of the room for a leaf region.
    fn leaf_room(&self, id: usize, region: Region, config: &GenerationConfig, rng: &mut StdRng) -> Room {
        if config.bsp_full_rooms {
            return Room::from_corners(
                id,
                region.x,
                region.y,
                region.x + region.w - 1,
                region.y + region.h - 1,
            );
        }

        let min = config.room_min_size.min(region.w).min(region.h);
        let w = rng.gen_range(min..=region.w);
        let h = rng.gen_range(min..=region.h);
        let x1 = rng.gen_range(region.x..=region.x + region.w - w);
        let y1 = rng.gen_range(region.y..=region.y + region.h - h);
        Room::from_corners(id, x1, y1, x1 + w - 1, y1 + h - 1)
    }

    /// Carves rooms for every leaf and connectors for every split, post-order.
    /// Returns the indices into `rooms` of the rooms below `node`.
    fn build(
        &self,
        node: &BspNode,
        grid: &mut TileGrid,
        rooms: &mut Vec<Room>,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Vec<usize> {
        let (left, right, split) = match (&node.left, &node.right, node.split) {
            (Some(left), Some(right), Some(split)) => (left, right, split),
            _ => {
                let room = self.leaf_room(rooms.len(), node.region, config, rng);
                grid.carve_room(&room);
                rooms.push(room);
                return vec![rooms.len() - 1];
            }
        };

        let mut below = self.build(left, grid, rooms, config, rng);
        let right_rooms = self.build(right, grid, rooms, config, rng);

        let closest = below
            .iter()
            .flat_map(|&a| right_rooms.iter().map(move |&b| (a, b)))
            .min_by_key(|&(a, b)| rooms[a].center().manhattan_distance(rooms[b].center()));
        if let Some((a, b)) = closest {
            connect(grid, &rooms[a], &rooms[b], split, rng);
        }

        below.extend(right_rooms);
        below
    }
}

/// Joins room `a` (west or north) to room `b` (east or south).
///
/// Straight corridor when the floors share a row (or column), otherwise a
/// dogleg through one coordinate in the gap between them.
fn connect(grid: &mut TileGrid, a: &Room, b: &Room, split: Split, rng: &mut StdRng) {
    match split {
        Split::Vertical => {
            let lo = a.y1.max(b.y1) + 1;
            let hi = a.y2.min(b.y2) - 1;
            if lo <= hi {
                let y = rng.gen_range(lo..=hi);
                grid.carve_horizontal(a.x2 - 1, b.x1 + 1, y);
            } else {
                let ya = rng.gen_range(a.y1 + 1..=a.y2 - 1);
                let yb = rng.gen_range(b.y1 + 1..=b.y2 - 1);
                let x = rng.gen_range(a.x2..=b.x1);
                grid.carve_horizontal(a.x2 - 1, x, ya);
                grid.carve_vertical(ya, yb, x);
                grid.carve_horizontal(x, b.x1 + 1, yb);
            }
        }
        Split::Horizontal => {
            let lo = a.x1.max(b.x1) + 1;
            let hi = a.x2.min(b.x2) - 1;
            if lo <= hi {
                let x = rng.gen_range(lo..=hi);
                grid.carve_vertical(a.y2 - 1, b.y1 + 1, x);
            } else {
                let xa = rng.gen_range(a.x1 + 1..=a.x2 - 1);
                let xb = rng.gen_range(b.x1 + 1..=b.x2 - 1);
                let y = rng.gen_range(a.y2..=b.y1);
                grid.carve_vertical(a.y2 - 1, y, xa);
                grid.carve_horizontal(xa, xb, y);
                grid.carve_vertical(y, b.y1 + 1, xb);
            }
        }
    }
}

impl Generator<TileGrid> for BspGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> BreakdownResult<TileGrid> {
        config.validate()?;
        let mut grid = TileGrid::new(config.width, config.height);
        let root = Region {
            x: 0,
            y: 0,
            w: config.width,
            h: config.height,
        };
        let tree = self.partition(root, config.bsp_depth, config, rng);

        let mut rooms = Vec::with_capacity(tree.leaf_count());
        self.build(&tree, &mut grid, &mut rooms, config, rng);

        if rooms.len() < config.min_rooms {
            return Err(BreakdownError::GenerationFailed(format!(
                "partitioned into {} rooms, need at least {}",
                rooms.len(),
                config.min_rooms
            )));
        }

        debug!(
            "{}: {} leaves at depth {}",
            self.generator_type(),
            rooms.len(),
            config.bsp_depth
        );
        for room in rooms {
            grid.add_room(room);
        }
        Ok(grid)
    }

    fn validate(&self, grid: &TileGrid, config: &GenerationConfig) -> BreakdownResult<()> {
        utils::validate_grid(grid, config)?;
        utils::validate_connectivity(grid)
    }

    fn generator_type(&self) -> &'static str {
        "BspGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    fn leaves(node: &BspNode, out: &mut Vec<Region>) {
        match (&node.left, &node.right) {
            (Some(left), Some(right)) => {
                leaves(left, out);
                leaves(right, out);
            }
            _ => out.push(node.region),
        }
    }

    #[test]
    fn test_partition_respects_minimum_leaf_size() {
        let config = GenerationConfig::new(11);
        let mut rng = utils::create_rng(&config);
        let root = Region { x: 0, y: 0, w: 100, h: 80 };
        let tree = BspGenerator::new().partition(root, config.bsp_depth, &config, &mut rng);

        let mut regions = Vec::new();
        leaves(&tree, &mut regions);
        assert_eq!(regions.len(), tree.leaf_count());
        assert!(regions.len() > 1);
        for region in &regions {
            assert!(region.w >= config.room_min_size + 1);
            assert!(region.h >= config.room_min_size + 1);
        }
        let area: i32 = regions.iter().map(|r| r.w * r.h).sum();
        assert_eq!(area, 100 * 80);
    }

    #[test]
    fn test_zero_depth_is_one_leaf() {
        let config = GenerationConfig::new(1);
        let mut rng = utils::create_rng(&config);
        let root = Region { x: 0, y: 0, w: 40, h: 40 };
        let tree = BspGenerator::new().partition(root, 0, &config, &mut rng);
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_generated_grid_is_connected_and_walled() {
        for seed in [1, 2, 3, 4, 5] {
            let config = GenerationConfig::for_testing(seed);
            let mut rng = utils::create_rng(&config);
            let generator = BspGenerator::new();
            let grid = generator.generate(&config, &mut rng).unwrap();
            assert!(generator.validate(&grid, &config).is_ok());
        }
    }

    #[test]
    fn test_full_rooms_fill_their_region() {
        let config = GenerationConfig {
            bsp_full_rooms: true,
            ..GenerationConfig::for_testing(6)
        };
        let mut rng = utils::create_rng(&config);
        let grid = BspGenerator::new().generate(&config, &mut rng).unwrap();
        let first = grid.rooms()[0];
        assert_eq!((first.x1, first.y1), (0, 0));
        assert!(grid.is_walkable(Position::new(1, 1)));
    }

    #[test]
    fn test_straight_connector_when_floors_share_rows() {
        let config = GenerationConfig::new(3);
        let mut rng = utils::create_rng(&config);
        let mut grid = TileGrid::new(30, 12);
        let a = Room::from_corners(0, 1, 1, 7, 8);
        let b = Room::from_corners(1, 15, 2, 22, 9);
        grid.carve_room(&a);
        grid.carve_room(&b);
        connect(&mut grid, &a, &b, Split::Vertical, &mut rng);

        grid.add_room(a);
        grid.add_room(b);
        assert!(utils::validate_connectivity(&grid).is_ok());
    }

    #[test]
    fn test_dogleg_connector_when_floors_are_disjoint() {
        let config = GenerationConfig::new(4);
        let mut rng = utils::create_rng(&config);
        let mut grid = TileGrid::new(30, 30);
        let a = Room::from_corners(0, 1, 1, 8, 7);
        let b = Room::from_corners(1, 12, 14, 20, 22);
        grid.carve_room(&a);
        grid.carve_room(&b);
        connect(&mut grid, &a, &b, Split::Horizontal, &mut rng);

        grid.add_room(a);
        grid.add_room(b);
        assert!(utils::validate_connectivity(&grid).is_ok());
    }
}
