//! The CostField contains the per-cell traversal cost of a sector. A value of
//! `1` is the default, [IMPASSABLE] (`0xffff`) marks a cell that world
//! content has made non-traversable (a building, a conveyor, a resource
//! deposit). Any other value indicates a harder cost of movement.
//!
//! An example cost field may look:
//!
//! ```text
//!  _______________________________________
//! |     |     |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |
//! |  1  |  1  | MAX | MAX | MAX |  1  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |
//! |  1  |  1  | MAX | MAX | MAX |  1  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|
//! ```
//!

use super::*;
use crate::prelude::*;

#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CostField {
	/// Number of cells along one edge
	resolution: usize,
	/// Flat array of costs
	values: Vec<u32>,
}

impl Field<u32> for CostField {
	fn get(&self) -> &[u32] {
		&self.values
	}
	fn get_resolution(&self) -> usize {
		self.resolution
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> u32 {
		let index = check_bounds("CostField", field_cell, self.resolution);
		self.values[index]
	}
	fn set_field_cell_value(&mut self, value: u32, field_cell: FieldCell) {
		let index = check_bounds("CostField", field_cell, self.resolution);
		self.values[index] = value;
	}
}

impl CostField {
	/// Create a new [CostField] where every cell costs `1`
	pub fn new(resolution: usize) -> Self {
		CostField::new_with_cost(resolution, DEFAULT_CELL_COST)
	}
	/// Create a new [CostField] where every cell costs `cost`
	pub fn new_with_cost(resolution: usize, cost: u32) -> Self {
		CostField {
			resolution,
			values: vec![cost; resolution * resolution],
		}
	}
	/// Derive the [CostField] from the occupancy of a sector's cells
	pub fn from_cells(cells: &[Cell], resolution: usize) -> Self {
		let values = cells.iter().map(|c| c.get_flow_field_cost()).collect();
		CostField { resolution, values }
	}
	/// Cost at a flat index
	pub fn get_value(&self, index: usize) -> u32 {
		self.values[index]
	}
	/// Set the cost at a flat index
	pub fn set_value(&mut self, index: usize, value: u32) {
		self.values[index] = value;
	}
	/// Whether a wave may cross the cell at a flat index
	pub fn is_passable(&self, index: usize) -> bool {
		self.values[index] < IMPASSABLE
	}
}
