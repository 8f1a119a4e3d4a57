//! World boundary policy.

use crate::point::Point;
use crate::rect::Rect;
use crate::scalar::Scalar;

/// How the simulation world treats coordinates beyond its bounds.
///
/// This is a policy switch, not a universal rule: most models run on a
/// bounded plane, a few on a torus.
///
/// # Examples
///
/// ```
/// use halo_core::{RealPoint, RealRect, Topology};
///
/// let world = RealRect::new(RealPoint::from([0.0, 0.0]), RealPoint::from([100.0, 50.0])).unwrap();
/// let p = RealPoint::from([101.0, -1.0]);
/// assert_eq!(Topology::Bounded.resolve(&p, &world), None);
/// assert_eq!(
///     Topology::Toroidal.resolve(&p, &world),
///     Some(RealPoint::from([1.0, 49.0]))
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Coordinates outside the world do not exist.
    #[default]
    Bounded,
    /// Every axis wraps around (periodic boundary).
    Toroidal,
}

impl Topology {
    /// Map `point` into `world` under this policy.
    ///
    /// Points already inside `world` are returned unchanged. Outside points
    /// yield `None` on a bounded world and are wrapped on a toroidal one.
    pub fn resolve<T: Scalar>(self, point: &Point<T>, world: &Rect<T>) -> Option<Point<T>> {
        if world.contains(point) {
            return Some(point.clone());
        }
        match self {
            Self::Bounded => None,
            Self::Toroidal => Some(point.to_toroidal(world)),
        }
    }

    /// `true` for [`Topology::Toroidal`].
    pub fn wraps(self) -> bool {
        self == Self::Toroidal
    }
}
