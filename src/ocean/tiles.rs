//! Arena of ocean tiles placed on a lattice around the simulation origin.

use glam::Vec3;

use crate::host::TileId;
use crate::params::OceanParameters;

/// One tile instance: where it sits and which LOD it draws
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveTile {
    pub row: usize,
    pub col: usize,
    pub lod: usize,
    pub offset: Vec3,
}

/// Tiles indexed by `row * tiles_count + col`
#[derive(Debug, Clone)]
pub struct TileLattice {
    tiles_count: usize,
    tiles: Vec<WaveTile>,
}

impl TileLattice {
    /// Lay out `tiles_count²` tiles centred on the origin.
    ///
    /// LOD grows with the Chebyshev ring distance from the centre tile and is
    /// capped at the coarsest available level.
    pub fn new(params: &OceanParameters) -> Self {
        let n = params.tiles_count;
        let centre = n / 2;
        let max_lod = params.max_lod();

        let mut tiles = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                let ring = row.abs_diff(centre).max(col.abs_diff(centre));
                tiles.push(WaveTile {
                    row,
                    col,
                    lod: ring.min(max_lod - 1),
                    offset: Vec3::new(
                        (col as f32 - centre as f32) * params.tile_size.x,
                        params.origin_height,
                        (row as f32 - centre as f32) * params.tile_size.z,
                    ),
                });
            }
        }

        Self { tiles_count: n, tiles }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&WaveTile> {
        if row < self.tiles_count && col < self.tiles_count {
            self.tiles.get(row * self.tiles_count + col)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &WaveTile)> {
        self.tiles.iter().enumerate().map(|(i, t)| (TileId(i), t))
    }

    /// Tiles drawing LOD `lod`
    pub fn at_lod(&self, lod: usize) -> impl Iterator<Item = (TileId, &WaveTile)> {
        self.iter().filter(move |(_, t)| t.lod == lod)
    }
}
