//! Destructible heightmap terrain
//!
//! Heights are stored in "local" orientation (larger = taller) while bodies
//! live in screen space (y grows downward). `base` converts between the two:
//! the surface of column `x` sits at screen y `base - height(x)`.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_SLOPE;
use crate::error::TerrainError;

/// Bounds for terrain generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainParams {
    pub width: usize,
    /// Soft ceiling; the walk turns downward on reaching it and never exceeds it
    pub max_height: u32,
    /// Soft floor; the walk turns upward on reaching it
    pub min_height: u32,
    /// Screen y of height zero
    pub base: i32,
}

impl TerrainParams {
    /// Ground between a quarter and three quarters of the field height
    pub fn for_field(width: usize, height: i32) -> Self {
        let height = height.max(0);
        Self {
            width,
            max_height: (3 * height / 4) as u32,
            min_height: (height / 4) as u32,
            base: height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    heights: Vec<u32>,
    minimum: u32,
    maximum: u32,
    base: i32,
    /// Bumped on every height change so render caches know to rebuild
    generation: u64,
}

impl Terrain {
    /// Generate rolling terrain with a bounded random walk.
    ///
    /// The slope drifts by -1, 0 or +1 per column and stays within
    /// `±MAX_SLOPE`. Whenever the height reaches a bound the drift is forced
    /// back toward the interior, so the profile never wanders off.
    pub fn generate<R: Rng>(params: &TerrainParams, rng: &mut R) -> Result<Self, TerrainError> {
        if params.width < 2 || params.min_height >= params.max_height {
            return Err(TerrainError::InvalidDimensions {
                width: params.width,
                min_height: params.min_height,
                max_height: params.max_height,
            });
        }

        let min = params.min_height as i32;
        let max = params.max_height as i32;

        let mut slope_change: i32 = rng.random_range(-1..=1);
        let mut slope: i32 = rng.random_range(-MAX_SLOPE..=MAX_SLOPE);
        let mut height: i32 = rng.random_range(min..max);

        let mut heights = Vec::with_capacity(params.width);
        let mut minimum = height as u32;
        let mut maximum = height as u32;

        for _ in 0..params.width {
            heights.push(height as u32);
            minimum = minimum.min(height as u32);
            maximum = maximum.max(height as u32);

            height = (height + slope).clamp(0, max);
            slope = (slope + slope_change).clamp(-MAX_SLOPE, MAX_SLOPE);

            slope_change = if height >= max {
                -1
            } else if height <= min {
                1
            } else {
                rng.random_range(-1..=1)
            };
        }

        Ok(Self {
            heights,
            minimum,
            maximum,
            base: params.base,
            generation: 0,
        })
    }

    /// Build terrain from an explicit profile
    pub fn from_heights(heights: Vec<u32>, base: i32) -> Result<Self, TerrainError> {
        if heights.len() < 2 {
            return Err(TerrainError::InvalidDimensions {
                width: heights.len(),
                min_height: 0,
                max_height: 0,
            });
        }
        let mut terrain = Self {
            heights,
            minimum: 0,
            maximum: 0,
            base,
            generation: 0,
        };
        terrain.recalculate();
        Ok(terrain)
    }

    /// Flat ground of the given height
    pub fn flat(width: usize, height: u32, base: i32) -> Result<Self, TerrainError> {
        Self::from_heights(vec![height; width], base)
    }

    pub fn width(&self) -> usize {
        self.heights.len()
    }

    pub fn base(&self) -> i32 {
        self.base
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn heights(&self) -> &[u32] {
        &self.heights
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn column(&self, x: i32) -> Result<usize, TerrainError> {
        usize::try_from(x)
            .ok()
            .filter(|&i| i < self.heights.len())
            .ok_or(TerrainError::ColumnOutOfRange {
                x,
                width: self.heights.len(),
            })
    }

    /// Local height of column `x`
    pub fn height_at(&self, x: i32) -> Result<u32, TerrainError> {
        Ok(self.heights[self.column(x)?])
    }

    /// Screen y of the surface at column `x`
    pub fn surface_y(&self, x: i32) -> Result<i32, TerrainError> {
        Ok(self.base - self.height_at(x)? as i32)
    }

    /// True when `(x, y)` (local orientation) is off the field or underground
    pub fn is_illegal(&self, x: i32, y: i32) -> bool {
        match self.column(x) {
            Ok(i) => y < self.heights[i] as i32,
            Err(_) => true,
        }
    }

    /// Collision test for a body at a screen-space position
    pub fn is_illegal_at(&self, pos: Vec2) -> bool {
        self.is_illegal(pos.x as i32, (self.base as f32 - pos.y) as i32)
    }

    /// Terrain gradient at column `x`.
    ///
    /// The vertical difference is taken left-minus-right because local
    /// heights are mirrored against screen y.
    pub fn slope_at(&self, x: i32) -> Result<Vec2, TerrainError> {
        let i = self.column(x)?;
        let h = |i: usize| self.heights[i] as f32;
        let last = self.heights.len() - 1;

        Ok(if i == 0 {
            Vec2::new(1.0, h(0) - h(1))
        } else if i == last {
            Vec2::new(1.0, h(last - 1) - h(last))
        } else {
            Vec2::new(2.0, h(i - 1) - h(i + 1))
        })
    }

    /// Surface tangent at a contact point.
    ///
    /// A contact above the surface of an edge column means the body hit the
    /// side of the field, which acts as a vertical wall.
    pub fn contact_tangent(&self, contact: IVec2) -> Result<Vec2, TerrainError> {
        let last = self.heights.len() as i32 - 1;
        if (contact.x == 0 || contact.x == last) && contact.y < self.surface_y(contact.x)? {
            return Ok(Vec2::Y);
        }
        self.slope_at(contact.x)
    }

    /// Screen points where the profile crosses local height `y`.
    ///
    /// Each crossing is reported at the column on the above-ground side.
    pub fn intersections(&self, y: i32) -> Vec<IVec2> {
        if y < self.minimum as i32 || y > self.maximum as i32 {
            return Vec::new();
        }

        let mut previous = y < self.heights[0] as i32;
        let mut points = Vec::new();
        for (i, &h) in self.heights.iter().enumerate().skip(1) {
            let underground = y < h as i32;
            if underground != previous {
                let x = if underground { i - 1 } else { i };
                points.push(IVec2::new(x as i32, self.base - y));
            }
            previous = underground;
        }
        points
    }

    /// Nearest legal point to a (presumably illegal) screen point.
    ///
    /// Candidates are the crossings at the point's height (clamped into the
    /// profile's range) plus the surface of the nearest in-range column.
    /// The latter always exists, so a correction is always found.
    pub fn warp_point(&self, p: IVec2) -> IVec2 {
        // Saturated casts of far-off bodies reach i32::MIN/MAX, so widen first
        let search_y = (self.base as i64 - p.y as i64)
            .clamp(self.minimum as i64, self.maximum as i64) as i32;
        let mut candidates = self.intersections(search_y);

        let x = p.x.clamp(0, self.heights.len() as i32 - 1);
        let fallback = IVec2::new(x, p.y.min(self.base - self.heights[x as usize] as i32));
        candidates.push(fallback);

        let distance = |q: &IVec2| {
            let dx = q.x as i64 - p.x as i64;
            let dy = q.y as i64 - p.y as i64;
            (dx as f64).hypot(dy as f64)
        };
        candidates
            .into_iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            .unwrap_or(fallback)
    }

    /// Raise or lower column `x` by `dh`, never below zero
    pub fn offset(&mut self, x: i32, dh: i32) -> Result<(), TerrainError> {
        let i = self.column(x)?;
        self.offset_column(i, dh);
        Ok(())
    }

    fn offset_column(&mut self, i: usize, dh: i32) {
        let old = self.heights[i];
        let new = (old as i64 + dh as i64).clamp(0, u32::MAX as i64) as u32;
        if new != old {
            self.heights[i] = new;
            self.generation += 1;
            self.recalculate();
        }
    }

    /// Blow a circular hole of `radius` around screen point `center`.
    ///
    /// Only ground inside the circle is removed; ground above the circle's
    /// top edge is left alone, so no overhangs appear. Returns the number of
    /// columns that lost height.
    pub fn carve_crater(&mut self, center: IVec2, radius: i32) -> usize {
        let (cx, cy, r) = (center.x as i64, center.y as i64, radius as i64);
        let left = (cx - r).max(0);
        let right = (cx + r).min(self.heights.len() as i64 - 1);

        let mut carved = 0;
        for x in left..right {
            let dx = cx - x;
            let chord = ((r * r - dx * dx) as f64).sqrt() as i64;
            let i = x as usize;
            let surface = self.base as i64 - self.heights[i] as i64;

            let depth = (cy + chord - surface.max(cy - chord)).max(0);
            if depth > 0 && self.heights[i] > 0 {
                self.offset_column(i, -i32::try_from(depth).unwrap_or(i32::MAX));
                carved += 1;
            }
        }
        log::debug!("Crater at ({}, {}) carved {} columns", center.x, center.y, carved);
        carved
    }

    fn recalculate(&mut self) {
        self.minimum = self.heights.iter().copied().min().unwrap_or(0);
        self.maximum = self.heights.iter().copied().max().unwrap_or(0);
    }
}
