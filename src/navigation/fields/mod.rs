//! The kinds of fields held by every sector
//!

pub mod cost_field;
pub mod flow_field;
pub mod integration_field;

use bevy::prelude::*;

/// Defines required access to the flat field arrays of a sector. Values are
/// stored row by row, the value of a [FieldCell] lives at
/// `row * resolution + column`
pub trait Field<T> {
	/// Get a reference to the field array
	fn get(&self) -> &[T];
	/// Number of cells along one edge of the field
	fn get_resolution(&self) -> usize;
	/// Retrieve a field cell value
	fn get_field_cell_value(&self, field_cell: FieldCell) -> T;
	/// Set a field cell to a value
	fn set_field_cell_value(&mut self, value: T, field_cell: FieldCell);
}

/// Local coordinate of a cell within its sector, always inside
/// `[0, map_res)` on both axes
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct FieldCell((usize, usize));

impl FieldCell {
	/// Create a new instance of [FieldCell]
	pub fn new(column: usize, row: usize) -> Self {
		FieldCell((column, row))
	}
	/// Recover the [FieldCell] stored at `index` of a field of `resolution`
	pub fn from_index(index: usize, resolution: usize) -> Self {
		FieldCell((index % resolution, index / resolution))
	}
	/// Get the `(column, row)` tuple
	pub fn get_column_row(&self) -> (usize, usize) {
		self.0
	}
	pub fn get_column(&self) -> usize {
		self.0 .0
	}
	pub fn get_row(&self) -> usize {
		self.0 .1
	}
	/// Position of the cell in a flat field array of `resolution`
	pub fn get_index(&self, resolution: usize) -> usize {
		self.get_row() * resolution + self.get_column()
	}
	/// The cell as an integer vector, `x` is the column and `y` the row
	pub fn as_ivec2(&self) -> IVec2 {
		IVec2::new(self.get_column() as i32, self.get_row() as i32)
	}
	/// Convert a local vector back into a [FieldCell], returns [None] if it
	/// falls outside a field of `resolution`
	pub fn from_ivec2(local: IVec2, resolution: usize) -> Option<Self> {
		let res = resolution as i32;
		if local.x < 0 || local.y < 0 || local.x >= res || local.y >= res {
			None
		} else {
			Some(FieldCell::new(local.x as usize, local.y as usize))
		}
	}
}

/// Panic with a consistent message when a field is accessed out of range
fn out_of_bounds(kind: &str, field_cell: FieldCell, resolution: usize) -> ! {
	panic!(
		"Cannot access a {} value, index out of bounds. Asked for column {}, row {}, field resolution is {}",
		kind,
		field_cell.get_column(),
		field_cell.get_row(),
		resolution
	)
}

/// Check a [FieldCell] fits a field of `resolution`, panicking otherwise
fn check_bounds(kind: &str, field_cell: FieldCell, resolution: usize) -> usize {
	if field_cell.get_column() >= resolution || field_cell.get_row() >= resolution {
		out_of_bounds(kind, field_cell, resolution);
	}
	field_cell.get_index(resolution)
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn field_cell_index() {
		let cell = FieldCell::new(3, 2);
		assert_eq!(2 * 8 + 3, cell.get_index(8));
	}
	#[test]
	fn field_cell_from_index() {
		let cell = FieldCell::from_index(19, 8);
		assert_eq!(FieldCell::new(3, 2), cell);
	}
	#[test]
	fn field_cell_from_ivec2_outside() {
		assert!(FieldCell::from_ivec2(IVec2::new(-1, 0), 8).is_none());
		assert!(FieldCell::from_ivec2(IVec2::new(0, 8), 8).is_none());
		assert_eq!(
			Some(FieldCell::new(7, 0)),
			FieldCell::from_ivec2(IVec2::new(7, 0), 8)
		);
	}
}
