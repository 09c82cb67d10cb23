use glam::DVec3;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{error::VoronoiError, geometry::reflect};

/// One of the six walls of the simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Wall {
    XLow = 0,
    XHigh = 1,
    YLow = 2,
    YHigh = 3,
    ZLow = 4,
    ZHigh = 5,
}

impl Wall {
    /// Iterate over all six walls.
    pub fn all() -> impl Iterator<Item = Wall> {
        (0..6u8).filter_map(|w| Wall::try_from(w).ok())
    }

    /// The coordinate axis perpendicular to this wall.
    pub fn axis(self) -> usize {
        u8::from(self) as usize / 2
    }

    /// Whether this is the wall at the upper end of its axis.
    pub fn is_upper(self) -> bool {
        u8::from(self) % 2 == 1
    }

    /// Unit normal of this wall, pointing out of the box.
    pub fn outward_normal(self) -> DVec3 {
        let mut normal = DVec3::ZERO;
        normal[self.axis()] = if self.is_upper() { 1. } else { -1. };
        normal
    }
}

/// The cuboid simulation volume, possibly periodic along some axes.
///
/// Besides the box geometry, this also defines the mapping of positions into
/// the `[1, 2)` domain on which the exact predicates operate, and the corners
/// of the enclosing simplex every cell construction starts from.
#[derive(Clone, Debug)]
pub struct SimulationBoundary {
    anchor: DVec3,
    width: DVec3,
    periodic: [bool; 3],
    rescale_anchor: DVec3,
    inverse_side: f64,
    center: DVec3,
    side: f64,
}

impl SimulationBoundary {
    /// A box with the same periodicity along all axes.
    pub fn cuboid(anchor: DVec3, width: DVec3, periodic: bool) -> Result<Self, VoronoiError> {
        Self::new(anchor, width, [periodic; 3])
    }

    /// A box with lower corner `anchor` and extent `width`, periodic along the
    /// axes flagged in `periodic`.
    pub fn new(anchor: DVec3, width: DVec3, periodic: [bool; 3]) -> Result<Self, VoronoiError> {
        if !anchor.is_finite() || !width.is_finite() || width.min_element() <= 0. {
            return Err(VoronoiError::InvalidBoundary { anchor, width });
        }

        // Every point a cell can ever contain (neighbours, periodic images and
        // mirror images) lies within one box width of the box. The enclosing
        // simplex must contain all of them, and the rescaled domain must
        // contain the simplex. A power of two keeps the rescaling exact.
        let center = anchor + 0.5 * width;
        let side = (32. * width.max_element()).log2().ceil().exp2();
        Ok(Self {
            anchor,
            width,
            periodic,
            rescale_anchor: center - DVec3::splat(0.5 * side),
            inverse_side: 1. / side,
            center,
            side,
        })
    }

    /// The lower corner of the box.
    pub fn anchor(&self) -> DVec3 {
        self.anchor
    }

    /// The extent of the box. Also the period along periodic axes.
    pub fn width(&self) -> DVec3 {
        self.width
    }

    /// Periodicity flags per axis.
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Whether `loc` is a valid generator position.
    ///
    /// Along non-periodic axes, generators must lie inside the box and more
    /// than [`SimulationBoundary::wall_tolerance`] away from both walls.
    pub fn contains(&self, loc: DVec3) -> bool {
        let tolerance = self.wall_tolerance();
        (0..3).all(|axis| {
            let lower = self.anchor[axis];
            let upper = lower + self.width[axis];
            if self.periodic[axis] {
                loc[axis] >= lower && loc[axis] <= upper
            } else {
                loc[axis] - lower > tolerance && upper - loc[axis] > tolerance
            }
        })
    }

    /// Minimal distance between a generator and a closed wall.
    ///
    /// Four grid steps of the rescaled domain. A generator closer to a wall
    /// could land on the same grid point as its own mirror image.
    pub fn wall_tolerance(&self) -> f64 {
        4. * f64::EPSILON * self.side
    }

    /// The walls along the non-periodic axes, which bound the cells.
    pub fn closed_walls(&self) -> impl Iterator<Item = Wall> + '_ {
        Wall::all().filter(move |wall| !self.periodic[wall.axis()])
    }

    /// Coordinate of `wall` along its axis.
    pub fn wall_position(&self, wall: Wall) -> f64 {
        let axis = wall.axis();
        if wall.is_upper() {
            self.anchor[axis] + self.width[axis]
        } else {
            self.anchor[axis]
        }
    }

    /// Mirror image of `loc` across `wall`.
    pub fn mirror(&self, loc: DVec3, wall: Wall) -> DVec3 {
        reflect(loc, wall.axis(), self.wall_position(wall))
    }

    /// Rescale a position into the `[1, 2)` domain of the exact predicates.
    ///
    /// Only positions within one box width of the box are guaranteed to land
    /// inside that domain.
    pub fn rescale(&self, loc: DVec3) -> DVec3 {
        DVec3::ONE + (loc - self.rescale_anchor) * self.inverse_side
    }

    /// Map a rescaled position back to real coordinates.
    ///
    /// The scale factor is a power of two, so only the final translation
    /// rounds.
    pub(crate) fn unscale(&self, rescaled: DVec3) -> DVec3 {
        self.rescale_anchor + (rescaled - DVec3::ONE) * self.side
    }

    /// Rescale a position, or `None` if it falls outside the `[1, 2)` domain.
    pub(crate) fn try_rescale(&self, loc: DVec3) -> Option<DVec3> {
        let rescaled = self.rescale(loc);
        (rescaled.cmpge(DVec3::ONE).all() && rescaled.cmplt(DVec3::splat(2.)).all()).then_some(rescaled)
    }

    /// The positions and rescaled positions of the corners of a positively
    /// oriented regular simplex containing every point within one box width
    /// of the box.
    pub(crate) fn simplex_corners(&self) -> [(DVec3, DVec3); 4] {
        const DIRECTIONS: [DVec3; 4] = [
            DVec3::new(1., 1., 1.),
            DVec3::new(1., -1., -1.),
            DVec3::new(-1., -1., 1.),
            DVec3::new(-1., 1., -1.),
        ];
        let k = 0.25 * self.side;
        DIRECTIONS.map(|direction| {
            (
                self.center + k * direction,
                DVec3::splat(1.5) + 0.25 * direction,
            )
        })
    }
}
