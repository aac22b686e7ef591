//! UV projection, island unwrapping, and seam sewing.

pub mod project;
pub mod seam;
pub mod unwrap;

/// A coordinate axis, used by the planar and cylindrical projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn other_two(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_normal(n: glam::Vec3) -> Axis {
        let arr = n.to_array();
        let (mut best, mut best_abs) = (0usize, arr[0].abs());
        for i in 1..3 {
            if arr[i].abs() > best_abs {
                best = i;
                best_abs = arr[i].abs();
            }
        }
        match best {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }
}
