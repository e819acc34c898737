//! A [FlowField] is a flat array of 8-bit values derived from a settled
//! [IntegrationField]. The low nibble of each value encodes the direction to
//! step in, the high nibble carries flags identifying the goal and pathable
//! cells. A steering system reads the field to move agents without running a
//! search per agent.
//!

use super::{integration_field::SettledSectorFields, *};
use crate::prelude::*;

/// Bit to indicate a northerly direction
const BITS_NORTH: u8 = 0b0000_0001;
/// Bit to indicate an easterly direction
const BITS_EAST: u8 = 0b0000_0010;
/// Bit to indicate a southerly direction
const BITS_SOUTH: u8 = 0b0000_0100;
/// Bit to indicate a westerly direction
const BITS_WEST: u8 = 0b0000_1000;
/// Bit to indicate a north-easterly direction
const BITS_NORTH_EAST: u8 = 0b0000_0011;
/// Bit to indicate a south-easterly direction
const BITS_SOUTH_EAST: u8 = 0b0000_0110;
/// Bit to indicate south-westerly direction
const BITS_SOUTH_WEST: u8 = 0b0000_1100;
/// Bit to indicate a north-westerly direction
const BITS_NORTH_WEST: u8 = 0b0000_1001;
/// No direction, the cell is unreachable
const BITS_ZERO: u8 = 0b0000_0000;
/// Mask of the direction nibble
const BITS_DIRECTION: u8 = 0b0000_1111;
/// Flags a pathable field cell
const BITS_PATHABLE: u8 = 0b0001_0000;
/// Flags a field cell as being the goal
const BITS_GOAL: u8 = 0b0100_0000;

/// Convert an [Ordinal] to a bit representation
pub fn convert_ordinal_to_bits_dir(ordinal: Ordinal) -> u8 {
	match ordinal {
		Ordinal::North => BITS_NORTH,
		Ordinal::East => BITS_EAST,
		Ordinal::South => BITS_SOUTH,
		Ordinal::West => BITS_WEST,
		Ordinal::NorthEast => BITS_NORTH_EAST,
		Ordinal::SouthEast => BITS_SOUTH_EAST,
		Ordinal::SouthWest => BITS_SOUTH_WEST,
		Ordinal::NorthWest => BITS_NORTH_WEST,
	}
}

/// Read the direction nibble of a flow field value
pub fn get_ordinal_from_bits(cell_value: u8) -> Option<Ordinal> {
	match cell_value & BITS_DIRECTION {
		BITS_NORTH => Some(Ordinal::North),
		BITS_EAST => Some(Ordinal::East),
		BITS_SOUTH => Some(Ordinal::South),
		BITS_WEST => Some(Ordinal::West),
		BITS_NORTH_EAST => Some(Ordinal::NorthEast),
		BITS_SOUTH_EAST => Some(Ordinal::SouthEast),
		BITS_SOUTH_WEST => Some(Ordinal::SouthWest),
		BITS_NORTH_WEST => Some(Ordinal::NorthWest),
		_ => None,
	}
}

/// Whether the value marks the goal cell
pub fn is_goal(cell_value: u8) -> bool {
	cell_value & BITS_GOAL == BITS_GOAL
}

/// Whether the value marks a cell an agent can steer from
pub fn is_pathable(cell_value: u8) -> bool {
	cell_value & BITS_PATHABLE == BITS_PATHABLE
}

#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
/// Steering directions of one sector
pub struct FlowField {
	/// Number of cells along one edge
	resolution: usize,
	/// Flat array of direction bits and flags
	values: Vec<u8>,
}

impl Field<u8> for FlowField {
	fn get(&self) -> &[u8] {
		&self.values
	}
	fn get_resolution(&self) -> usize {
		self.resolution
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> u8 {
		let index = check_bounds("FlowField", field_cell, self.resolution);
		self.values[index]
	}
	fn set_field_cell_value(&mut self, value: u8, field_cell: FieldCell) {
		let index = check_bounds("FlowField", field_cell, self.resolution);
		self.values[index] = value;
	}
}

impl FlowField {
	/// Create a new [FlowField] with no directions
	pub fn new(resolution: usize) -> Self {
		FlowField {
			resolution,
			values: vec![BITS_ZERO; resolution * resolution],
		}
	}
	/// Derive the direction of every cell from a settled [IntegrationField].
	/// Each reached cell points at its neighbour with the strictly lowest
	/// integration value and the target is flagged as the goal, even when it
	/// sits on a blocked cell. Blocked and unreachable cells carry no
	/// direction
	pub fn calculate(&mut self, cost_field: &CostField, integration_field: &IntegrationField) {
		let settled = SettledSectorFields {
			cost: cost_field,
			integration: integration_field,
		};
		for index in 0..self.values.len() {
			let current = integration_field.get_value(index);
			self.values[index] = if current == 0 {
				BITS_GOAL | BITS_PATHABLE
			} else if current >= IMPASSABLE || !cost_field.is_passable(index) {
				BITS_ZERO
			} else {
				match integration_field::lowest_neighbour(&settled, index) {
					Some((ordinal, _)) => BITS_PATHABLE | convert_ordinal_to_bits_dir(ordinal),
					None => BITS_ZERO,
				}
			};
		}
	}
	pub fn get_value(&self, index: usize) -> u8 {
		self.values[index]
	}
	/// Direction to steer in from the cell at a flat index, [None] at the goal,
	/// at cells the wave never reached and outside of the field
	pub fn get_direction(&self, index: usize) -> Option<Ordinal> {
		self.values.get(index).copied().and_then(get_ordinal_from_bits)
	}
}
