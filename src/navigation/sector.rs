//! The world is split into square sectors of `map_res x map_res` cells. A
//! [Sector] owns the occupancy of its cells along with the fields used to
//! steer agents towards a target inside of it
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Unique ID of a sector, its position in the unbounded grid of sectors.
/// Sectors may have negative coordinates
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct SectorID((i32, i32));

impl SectorID {
	/// Create a new instance of [SectorID]
	pub fn new(column: i32, row: i32) -> Self {
		SectorID((column, row))
	}
	/// Get the sector `(column, row)` tuple
	pub fn get(&self) -> (i32, i32) {
		self.0
	}
	/// Get the sector column
	pub fn get_column(&self) -> i32 {
		self.0 .0
	}
	/// Get the sector row
	pub fn get_row(&self) -> i32 {
		self.0 .1
	}
	/// The ID as an integer vector
	pub fn as_ivec2(&self) -> IVec2 {
		IVec2::new(self.get_column(), self.get_row())
	}
	/// Grid coordinate of the north-west cell of the sector
	pub fn get_origin(&self, map_res: usize) -> IVec2 {
		self.as_ivec2() * map_res as i32
	}
}

impl From<IVec2> for SectorID {
	fn from(value: IVec2) -> Self {
		SectorID::new(value.x, value.y)
	}
}

/// A square block of cells along with its navigation fields
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug)]
pub struct Sector {
	/// Cells per edge
	map_res: usize,
	/// Occupancy, row by row
	cells: Vec<Cell>,
	/// Cost of crossing each cell, kept in sync with `cells`
	cost_field: CostField,
	/// Result of the last flow field calculation
	integration_field: IntegrationField,
	/// Directions derived from `integration_field`
	flow_field: FlowField,
}

impl Sector {
	/// Create a new [Sector] where every cell is empty and walkable
	pub fn new(map_res: usize) -> Self {
		Sector {
			map_res,
			cells: vec![Cell::default(); map_res * map_res],
			cost_field: CostField::new(map_res),
			integration_field: IntegrationField::new(map_res),
			flow_field: FlowField::new(map_res),
		}
	}
	/// Create a [Sector] from existing cells. Returns [None] if the number of
	/// cells is not `map_res * map_res`
	pub fn from_cells(cells: Vec<Cell>, map_res: usize) -> Option<Self> {
		if cells.len() != map_res * map_res {
			error!(
				"Sector needs {} cells, {} were supplied",
				map_res * map_res,
				cells.len()
			);
			return None;
		}
		let cost_field = CostField::from_cells(&cells, map_res);
		Some(Sector {
			map_res,
			cells,
			cost_field,
			integration_field: IntegrationField::new(map_res),
			flow_field: FlowField::new(map_res),
		})
	}
	pub fn get_map_res(&self) -> usize {
		self.map_res
	}
	pub fn get_cells(&self) -> &[Cell] {
		&self.cells
	}
	/// Get the [Cell] at a flat index
	pub fn get_cell(&self, cell_index: usize) -> Option<&Cell> {
		self.cells.get(cell_index)
	}
	pub fn get_cost_field(&self) -> &CostField {
		&self.cost_field
	}
	pub fn get_integration_field(&self) -> &IntegrationField {
		&self.integration_field
	}
	pub fn get_flow_field(&self) -> &FlowField {
		&self.flow_field
	}
	/// Place content on a cell, updating its walkability and cost
	pub fn set_cell_occupant(&mut self, field_cell: FieldCell, occupant: Option<CellOccupant>) {
		let index = field_cell.get_index(self.map_res);
		let cell = &mut self.cells[index];
		cell.set_occupant(occupant);
		self.cost_field.set_value(index, cell.get_flow_field_cost());
	}
	/// Remove any content from a cell
	pub fn clear_cell_occupant(&mut self, field_cell: FieldCell) {
		self.set_cell_occupant(field_cell, None);
	}
	/// Mark whether a road runs through a cell
	pub fn set_cell_road(&mut self, field_cell: FieldCell, road: bool) {
		let index = field_cell.get_index(self.map_res);
		self.cells[index].set_road(road);
	}
	/// Refresh the integration and flow fields towards a target cell of this
	/// sector. Any previous result is discarded
	pub fn compute_flow_field(&mut self, target: FieldCell) {
		self.integration_field.reset();
		let mut fields = SectorFields {
			cost: &self.cost_field,
			integration: &mut self.integration_field,
		};
		propagate_integration(&mut fields, target.get_index(self.map_res));
		self.flow_field
			.calculate(&self.cost_field, &self.integration_field);
	}
	/// Unit vector to steer along from the cell at a flat index, [None] at the
	/// target, at blocked cells, at cells that cannot reach it and for an
	/// index outside of the sector
	pub fn direction(&self, cell_index: usize) -> Option<Vec2> {
		self.flow_field
			.get_direction(cell_index)
			.map(|ordinal| ordinal.to_unit_vector())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn sector_origin_negative() {
		let id = SectorID::new(-1, 2);
		assert_eq!(IVec2::new(-32, 64), id.get_origin(32));
	}
	#[test]
	fn from_cells_wrong_length() {
		assert!(Sector::from_cells(vec![Cell::default(); 5], 2).is_none());
	}
	#[test]
	fn occupant_updates_cost() {
		let mut sector = Sector::new(4);
		let field_cell = FieldCell::new(1, 2);
		sector.set_cell_occupant(field_cell, Some(CellOccupant::Structure(3)));
		assert_eq!(IMPASSABLE, sector.get_cost_field().get_field_cell_value(field_cell));
		assert!(!sector.get_cell(9).unwrap().is_walkable());
		sector.clear_cell_occupant(field_cell);
		assert_eq!(1, sector.get_cost_field().get_field_cell_value(field_cell));
	}
	#[test]
	fn direction_towards_target() {
		let mut sector = Sector::new(4);
		sector.compute_flow_field(FieldCell::new(3, 0));
		let dir = sector.direction(FieldCell::new(0, 0).get_index(4)).unwrap();
		assert_eq!(Vec2::new(1.0, 0.0), dir);
		assert!(sector.direction(3).is_none());
		assert!(sector.direction(16).is_none());
	}
	#[test]
	fn recompute_discards_previous_target() {
		let mut sector = Sector::new(4);
		sector.compute_flow_field(FieldCell::new(0, 0));
		sector.compute_flow_field(FieldCell::new(3, 3));
		assert_eq!(6, sector.get_integration_field().get_value(0));
		assert_eq!(0, sector.get_integration_field().get_value(15));
	}
}
