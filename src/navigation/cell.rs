//! A [Cell] is the atomic unit of occupancy in the world grid. World content
//! (buildings, raw resources, conveyors and rails) marks a cell as occupied
//! which in turn decides whether units may walk through it and what it costs
//! a flow field wave to cross it.
//!

use bevy::prelude::*;

use crate::prelude::*;

/// What is placed on a [Cell]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CellOccupant {
	/// Part of a building, identified by the building ID
	Structure(u32),
	/// A raw resource deposit, identified by the kind of resource
	Resource(u32),
	/// A conveyor belt segment
	Conveyor,
	/// A rail segment, units may cross rails
	Rail,
}

impl CellOccupant {
	/// Whether units can walk over a cell holding this occupant
	pub fn is_walkable(&self) -> bool {
		matches!(self, CellOccupant::Rail)
	}
}

/// Occupancy state of one grid cell
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Cell {
	/// Content placed on the cell
	occupant: Option<CellOccupant>,
	/// Roads make a cell cheap for vehicles but never affect walkability
	road: bool,
	/// Cached walkability derived from `occupant`
	walkable: bool,
	/// Cost of crossing the cell for a flow field wave
	flow_field_cost: u32,
}

impl Default for Cell {
	fn default() -> Self {
		Cell {
			occupant: None,
			road: false,
			walkable: true,
			flow_field_cost: DEFAULT_CELL_COST,
		}
	}
}

impl Cell {
	/// Create a new [Cell] holding an occupant
	pub fn with_occupant(occupant: CellOccupant) -> Self {
		let mut cell = Cell::default();
		cell.set_occupant(Some(occupant));
		cell
	}
	/// Place or clear the content of the cell, updating walkability and cost
	pub fn set_occupant(&mut self, occupant: Option<CellOccupant>) {
		self.occupant = occupant;
		let walkable = occupant.map_or(true, |o| o.is_walkable());
		self.walkable = walkable;
		self.flow_field_cost = if walkable {
			DEFAULT_CELL_COST
		} else {
			IMPASSABLE
		};
	}
	/// Mark whether a road runs through the cell
	pub fn set_road(&mut self, road: bool) {
		self.road = road;
	}
	pub fn get_occupant(&self) -> Option<CellOccupant> {
		self.occupant
	}
	pub fn has_road(&self) -> bool {
		self.road
	}
	pub fn is_walkable(&self) -> bool {
		self.walkable
	}
	/// Nothing is placed on the cell
	pub fn is_empty(&self) -> bool {
		self.occupant.is_none()
	}
	pub fn get_flow_field_cost(&self) -> u32 {
		self.flow_field_cost
	}
	/// The building ID if the cell is part of a building
	pub fn get_structure(&self) -> Option<u32> {
		match self.occupant {
			Some(CellOccupant::Structure(id)) => Some(id),
			_ => None,
		}
	}
	/// The resource kind if the cell holds a resource deposit
	pub fn get_resource(&self) -> Option<u32> {
		match self.occupant {
			Some(CellOccupant::Resource(kind)) => Some(kind),
			_ => None,
		}
	}
}
