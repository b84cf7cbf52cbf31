//! Synthetic parts for end-to-end scenarios.
//!
//! Plates are built from square tiles. A tile is either solid or carries one
//! through hole at its center, modelled as a 32-sided rim with the top and
//! bottom faces fanned out to the tile border.

use std::f64::consts::TAU;

use feature_kernel::Vec3;

use crate::helpers::on_circle;
use crate::soup::TriangleSoup;

pub const RIM_SEGMENTS: usize = 32;

/// A through hole in the tile at `(column, row)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleSpec {
    pub column: usize,
    pub row: usize,
    pub radius: f64,
}

/// A rectangular plate lying on z = 0, its top face at `thickness`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateSpec {
    pub columns: usize,
    pub rows: usize,
    pub tile: f64,
    pub thickness: f64,
    pub holes: Vec<HoleSpec>,
}

impl PlateSpec {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            tile: 10.0,
            thickness: 3.0,
            holes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hole(mut self, column: usize, row: usize, radius: f64) -> Self {
        self.holes.push(HoleSpec { column, row, radius });
        self
    }

    pub fn width(&self) -> f64 {
        self.columns as f64 * self.tile
    }

    pub fn depth(&self) -> f64 {
        self.rows as f64 * self.tile
    }

    /// Center of a tile on the top face.
    pub fn tile_center(&self, column: usize, row: usize) -> Vec3 {
        Vec3::new(
            (column as f64 + 0.5) * self.tile,
            (row as f64 + 0.5) * self.tile,
            self.thickness,
        )
    }

    fn hole_at(&self, column: usize, row: usize) -> Option<&HoleSpec> {
        self.holes.iter().find(|h| h.column == column && h.row == row)
    }

    pub fn build(&self) -> TriangleSoup {
        let mut soup = TriangleSoup::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let top = self.tile_center(column, row);
                let bottom = Vec3::new(top.x, top.y, 0.0);
                match self.hole_at(column, row) {
                    Some(hole) => {
                        annulus(&mut soup, top, hole.radius, self.tile, Vec3::Z);
                        annulus(&mut soup, bottom, hole.radius, self.tile, -Vec3::Z);
                        hole_wall(&mut soup, bottom, hole.radius, self.thickness);
                    }
                    None => {
                        square(&mut soup, top, self.tile, Vec3::Z);
                        square(&mut soup, bottom, self.tile, -Vec3::Z);
                    }
                }
            }
        }
        self.sides(&mut soup);
        soup
    }

    fn sides(&self, soup: &mut TriangleSoup) {
        let (w, d, t) = (self.width(), self.depth(), self.thickness);
        let corner = |x: f64, y: f64, z: f64| Vec3::new(x, y, z);
        soup.push_quad(corner(0.0, 0.0, 0.0), corner(w, 0.0, 0.0), corner(w, 0.0, t), corner(0.0, 0.0, t), -Vec3::Y);
        soup.push_quad(corner(0.0, d, 0.0), corner(w, d, 0.0), corner(w, d, t), corner(0.0, d, t), Vec3::Y);
        soup.push_quad(corner(0.0, 0.0, 0.0), corner(0.0, d, 0.0), corner(0.0, d, t), corner(0.0, 0.0, t), -Vec3::X);
        soup.push_quad(corner(w, 0.0, 0.0), corner(w, d, 0.0), corner(w, d, t), corner(w, 0.0, t), Vec3::X);
    }
}

fn square(soup: &mut TriangleSoup, center: Vec3, size: f64, outward: Vec3) {
    let h = size * 0.5;
    let at = |dx: f64, dy: f64| center + Vec3::new(dx, dy, 0.0);
    soup.push_quad(at(-h, -h), at(h, -h), at(h, h), at(-h, h), outward);
}

/// Ring between a circular rim and the square tile border. The segment
/// count is a multiple of eight so the tile corners land on spokes.
fn annulus(soup: &mut TriangleSoup, center: Vec3, radius: f64, size: f64, outward: Vec3) {
    let h = size * 0.5;
    let border = |a: f64| {
        let (s, c) = a.sin_cos();
        let scale = h / c.abs().max(s.abs());
        center + Vec3::new(c * scale, s * scale, 0.0)
    };
    for k in 0..RIM_SEGMENTS {
        let a0 = TAU * k as f64 / RIM_SEGMENTS as f64;
        let a1 = TAU * (k + 1) as f64 / RIM_SEGMENTS as f64;
        soup.push_quad(
            on_circle(center, radius, a0),
            on_circle(center, radius, a1),
            border(a1),
            border(a0),
            outward,
        );
    }
}

fn hole_wall(soup: &mut TriangleSoup, bottom: Vec3, radius: f64, height: f64) {
    let lift = Vec3::new(0.0, 0.0, height);
    for k in 0..RIM_SEGMENTS {
        let a0 = TAU * k as f64 / RIM_SEGMENTS as f64;
        let a1 = TAU * (k + 1) as f64 / RIM_SEGMENTS as f64;
        let mid = 0.5 * (a0 + a1);
        let inward = Vec3::new(-mid.cos(), -mid.sin(), 0.0);
        let b0 = on_circle(bottom, radius, a0);
        let b1 = on_circle(bottom, radius, a1);
        soup.push_quad(b0, b1, b1 + lift, b0 + lift, inward);
    }
}

/// A 20 x 10 plate with a radius-2 hole in each of its two tiles.
pub fn two_hole_plate() -> (PlateSpec, TriangleSoup) {
    let spec = PlateSpec::new(2, 1).with_hole(0, 0, 2.0).with_hole(1, 0, 2.0);
    let soup = spec.build();
    (spec, soup)
}

/// Two plates at different heights, the upper one shifted clear of the
/// lower one in Y.
pub fn two_level_part(offset: Vec3) -> (PlateSpec, PlateSpec, TriangleSoup) {
    let lower = PlateSpec::new(2, 1).with_hole(0, 0, 2.0).with_hole(1, 0, 1.5);
    let upper = PlateSpec::new(2, 1).with_hole(0, 0, 2.0);
    let mut soup = lower.build();
    soup.extend(upper.build().translated(offset));
    (lower, upper, soup)
}
