//! Useful structures and tools shared by the grid index, the fields and the
//! searches
//!

use bevy::prelude::*;

/// Default number of cells along one edge of a sector
pub const DEFAULT_MAP_RES: usize = 32;
/// Default world-space length of a cell edge
pub const DEFAULT_CELL_SIZE: f32 = 1.0;
/// Cost of a cell that can never be traversed. Integration fields use the
/// same value to mark cells which have not been reached
pub const IMPASSABLE: u32 = 0xffff;
/// Cost of a regular walkable cell
pub const DEFAULT_CELL_COST: u32 = 1;
/// Extra cost applied when an integration wave moves diagonally
pub const DIAGONAL_PENALTY: u32 = 1;

/// Convenience way of describing the 8 directions around a cell, either at
/// cell granularity or sector granularity.
///
/// Rows grow towards the south (`+y`) and columns grow towards the east
/// (`+x`)
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
}

impl Ordinal {
	/// Orthogonal directions in the order they are expanded by a search:
	/// west, east, north, south
	pub const ORTHOGONAL: [Ordinal; 4] =
		[Ordinal::West, Ordinal::East, Ordinal::North, Ordinal::South];
	/// Diagonal directions in the order they are expanded by a search
	pub const DIAGONAL: [Ordinal; 4] = [
		Ordinal::NorthWest,
		Ordinal::SouthWest,
		Ordinal::NorthEast,
		Ordinal::SouthEast,
	];

	/// The `(dx, dy)` step of this direction
	pub fn to_offset(&self) -> IVec2 {
		match self {
			Ordinal::North => IVec2::new(0, -1),
			Ordinal::East => IVec2::new(1, 0),
			Ordinal::South => IVec2::new(0, 1),
			Ordinal::West => IVec2::new(-1, 0),
			Ordinal::NorthEast => IVec2::new(1, -1),
			Ordinal::SouthEast => IVec2::new(1, 1),
			Ordinal::SouthWest => IVec2::new(-1, 1),
			Ordinal::NorthWest => IVec2::new(-1, -1),
		}
	}
	/// Whether this is one of the four diagonal directions
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// For a diagonal, the two orthogonal directions whose cells flank the
	/// move. An orthogonal direction has no flanks
	pub fn flanks(&self) -> Option<(Ordinal, Ordinal)> {
		match self {
			Ordinal::NorthEast => Some((Ordinal::North, Ordinal::East)),
			Ordinal::SouthEast => Some((Ordinal::South, Ordinal::East)),
			Ordinal::SouthWest => Some((Ordinal::South, Ordinal::West)),
			Ordinal::NorthWest => Some((Ordinal::North, Ordinal::West)),
			_ => None,
		}
	}
	/// Returns the opposite [Ordinal] of the current
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::East => Ordinal::West,
			Ordinal::South => Ordinal::North,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::NorthWest => Ordinal::SouthEast,
		}
	}
	/// For two cells next to each other find the [Ordinal] pointing from the
	/// `source` to the `target`. Returns [None] if they are not adjacent
	pub fn cell_to_cell_direction(target: IVec2, source: IVec2) -> Option<Self> {
		let step = target - source;
		match (step.x, step.y) {
			(0, -1) => Some(Ordinal::North),
			(1, -1) => Some(Ordinal::NorthEast),
			(1, 0) => Some(Ordinal::East),
			(1, 1) => Some(Ordinal::SouthEast),
			(0, 1) => Some(Ordinal::South),
			(-1, 1) => Some(Ordinal::SouthWest),
			(-1, 0) => Some(Ordinal::West),
			(-1, -1) => Some(Ordinal::NorthWest),
			_ => None,
		}
	}
	/// Unit vector of the direction, diagonals are normalised
	pub fn to_unit_vector(&self) -> Vec2 {
		self.to_offset().as_vec2().normalize()
	}
}

/// Component-wise floor division which rounds towards negative infinity,
/// `-1 / 32` is `-1` rather than `0`
pub fn floor_div(value: IVec2, divisor: i32) -> IVec2 {
	IVec2::new(value.x.div_euclid(divisor), value.y.div_euclid(divisor))
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn floor_div_negative() {
		let result = floor_div(IVec2::new(-1, -33), 32);
		assert_eq!(IVec2::new(-1, -2), result);
	}
	#[test]
	fn floor_div_positive() {
		let result = floor_div(IVec2::new(31, 32), 32);
		assert_eq!(IVec2::new(0, 1), result);
	}
	#[test]
	fn cell_to_cell_north_east() {
		let target = IVec2::new(7, 2);
		let source = IVec2::new(6, 3);
		let result = Ordinal::cell_to_cell_direction(target, source);
		assert_eq!(Some(Ordinal::NorthEast), result);
	}
	#[test]
	fn cell_to_cell_west() {
		let target = IVec2::new(-6, 7);
		let source = IVec2::new(-5, 7);
		let result = Ordinal::cell_to_cell_direction(target, source);
		assert_eq!(Some(Ordinal::West), result);
	}
	#[test]
	fn cell_to_cell_not_adjacent() {
		let target = IVec2::new(0, 0);
		let source = IVec2::new(2, 0);
		assert!(Ordinal::cell_to_cell_direction(target, source).is_none());
	}
	#[test]
	fn diagonal_flanks() {
		let (a, b) = Ordinal::SouthWest.flanks().unwrap();
		assert_eq!(Ordinal::South, a);
		assert_eq!(Ordinal::West, b);
		assert!(Ordinal::North.flanks().is_none());
	}
	#[test]
	fn offsets_round_trip_through_inverse() {
		for ord in Ordinal::ORTHOGONAL.iter().chain(Ordinal::DIAGONAL.iter()) {
			assert_eq!(-ord.to_offset(), ord.inverse().to_offset());
		}
	}
}
