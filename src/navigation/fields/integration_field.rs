//! The IntegrationField holds the cumulative cost of travelling from each
//! cell to a target cell. It is reset to [IMPASSABLE] before every
//! calculation, the target is seeded with `0` and a wave is relaxed outwards
//! from it.
//!
//! The wave is label-correcting: a cell may be lowered and pushed back onto
//! the frontier several times before every value settles. Cells are taken
//! from the frontier in insertion order and a cell already waiting is not
//! queued twice.
//!
//! Using a [CostField] of:
//!
//! ```text
//!  ___________________________
//! |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  1  | MAX | MAX | MAX |  1  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! With the target in the bottom centre the result is:
//!
//! ```text
//!  ___________________________
//! |     |     |     |     |     |
//! |  4  |  5  |  6  |  5  |  4  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  3  | MAX | MAX | MAX |  3  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  2  |  1  |  0  |  1  |  2  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Diagonal steps cost one more than the orthogonal equivalent and are only
//! taken when at least one of the two orthogonal cells flanking the step is
//! passable.
//!

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use super::*;
use crate::prelude::*;

/// Something a flow field wave can be relaxed over. A single sector exposes
/// its local cell indices as nodes, a corridor exposes absolute grid
/// coordinates spanning several sectors
pub trait IntegrationGrid {
	/// Address of a cell within the grid
	type Node: Copy + Eq + Hash;
	/// The cell one step in `ordinal` from `node`, [None] if that cell is not
	/// part of the grid
	fn get_neighbour(&self, node: Self::Node, ordinal: Ordinal) -> Option<Self::Node>;
	/// Cost of entering a cell, [IMPASSABLE] for blocked cells
	fn get_cost(&self, node: Self::Node) -> u32;
	/// Current integration value of a cell
	fn get_integration(&self, node: Self::Node) -> u32;
	/// Store a new integration value for a cell
	fn set_integration(&mut self, node: Self::Node, value: u32);
}

/// Cells pending relaxation. Taken in insertion order, a cell already
/// pending is not queued again
struct Frontier<N> {
	/// Insertion order
	queue: VecDeque<N>,
	/// Membership
	pending: HashSet<N>,
}

impl<N: Copy + Eq + Hash> Frontier<N> {
	/// Create a frontier holding only `seed`
	fn new(seed: N) -> Self {
		let mut frontier = Frontier {
			queue: VecDeque::new(),
			pending: HashSet::new(),
		};
		frontier.insert(seed);
		frontier
	}
	/// Queue a cell unless it is already pending
	fn insert(&mut self, node: N) {
		if self.pending.insert(node) {
			self.queue.push_back(node);
		}
	}
	/// Take the oldest pending cell
	fn pop(&mut self) -> Option<N> {
		let node = self.queue.pop_front()?;
		self.pending.remove(&node);
		Some(node)
	}
}

/// A diagonal step from `node` may be considered when at least one of its
/// flanking orthogonal cells exists and is passable
pub fn is_diagonal_open<G: IntegrationGrid>(grid: &G, node: G::Node, ordinal: Ordinal) -> bool {
	match ordinal.flanks() {
		Some((a, b)) => [a, b].iter().any(|flank| {
			grid.get_neighbour(node, *flank)
				.is_some_and(|n| grid.get_cost(n) < IMPASSABLE)
		}),
		None => true,
	}
}

/// Relax a wave outwards from `target` until every reachable cell holds its
/// cheapest cumulative cost. The grid is expected to have been reset to
/// [IMPASSABLE], the target is seeded with `0` here
pub fn propagate_integration<G: IntegrationGrid>(grid: &mut G, target: G::Node) {
	grid.set_integration(target, 0);
	let mut frontier = Frontier::new(target);
	let mut relaxations = 0_usize;
	while let Some(current) = frontier.pop() {
		let current_value = grid.get_integration(current);
		for ordinal in Ordinal::ORTHOGONAL.iter().chain(Ordinal::DIAGONAL.iter()) {
			let Some(neighbour) = grid.get_neighbour(current, *ordinal) else {
				continue;
			};
			let cost = grid.get_cost(neighbour);
			if cost >= IMPASSABLE {
				continue;
			}
			let candidate = if ordinal.is_diagonal() {
				if !is_diagonal_open(grid, current, *ordinal) {
					continue;
				}
				current_value + cost + DIAGONAL_PENALTY
			} else {
				current_value + cost
			};
			if candidate < grid.get_integration(neighbour) {
				grid.set_integration(neighbour, candidate);
				frontier.insert(neighbour);
				relaxations += 1;
			}
		}
	}
	trace!("Integration wave settled after {} relaxations", relaxations);
}

/// Find the neighbour of `node` with the strictly lowest integration value,
/// it must also be strictly lower than the value of `node` itself. Diagonal
/// neighbours follow the same flank rule as the wave so a cell always points
/// at the cell it was reached from
pub fn lowest_neighbour<G: IntegrationGrid>(
	grid: &G,
	node: G::Node,
) -> Option<(Ordinal, G::Node)> {
	let mut best_value = grid.get_integration(node);
	let mut best = None;
	for ordinal in Ordinal::ORTHOGONAL.iter().chain(Ordinal::DIAGONAL.iter()) {
		let Some(neighbour) = grid.get_neighbour(node, *ordinal) else {
			continue;
		};
		if ordinal.is_diagonal() && !is_diagonal_open(grid, node, *ordinal) {
			continue;
		}
		let value = grid.get_integration(neighbour);
		if value < best_value {
			best_value = value;
			best = Some((*ordinal, neighbour));
		}
	}
	best
}

/// Integration values of one sector
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationField {
	/// Number of cells along one edge
	resolution: usize,
	/// Flat array of cumulative costs
	values: Vec<u32>,
}

impl Field<u32> for IntegrationField {
	fn get(&self) -> &[u32] {
		&self.values
	}
	fn get_resolution(&self) -> usize {
		self.resolution
	}
	fn get_field_cell_value(&self, field_cell: FieldCell) -> u32 {
		let index = check_bounds("IntegrationField", field_cell, self.resolution);
		self.values[index]
	}
	fn set_field_cell_value(&mut self, value: u32, field_cell: FieldCell) {
		let index = check_bounds("IntegrationField", field_cell, self.resolution);
		self.values[index] = value;
	}
}

impl IntegrationField {
	/// Create a new [IntegrationField] with every cell unreached
	pub fn new(resolution: usize) -> Self {
		IntegrationField {
			resolution,
			values: vec![IMPASSABLE; resolution * resolution],
		}
	}
	/// Mark every cell as unreached
	pub fn reset(&mut self) {
		self.values.fill(IMPASSABLE);
	}
	pub fn get_value(&self, index: usize) -> u32 {
		self.values[index]
	}
	pub fn set_value(&mut self, index: usize, value: u32) {
		self.values[index] = value;
	}
	/// Whether the wave reached the cell at a flat index
	pub fn is_reached(&self, index: usize) -> bool {
		self.values[index] < IMPASSABLE
	}
}

/// Pairs a [CostField] with an [IntegrationField] of the same sector so a
/// wave can run over them with flat indices as nodes
pub struct SectorFields<'a> {
	/// Costs read by the wave
	pub cost: &'a CostField,
	/// Values written by the wave
	pub integration: &'a mut IntegrationField,
}

impl IntegrationGrid for SectorFields<'_> {
	type Node = usize;
	fn get_neighbour(&self, node: usize, ordinal: Ordinal) -> Option<usize> {
		let resolution = self.cost.get_resolution();
		let cell = FieldCell::from_index(node, resolution);
		let next = cell.as_ivec2() + ordinal.to_offset();
		FieldCell::from_ivec2(next, resolution).map(|c| c.get_index(resolution))
	}
	fn get_cost(&self, node: usize) -> u32 {
		self.cost.get_value(node)
	}
	fn get_integration(&self, node: usize) -> u32 {
		self.integration.get_value(node)
	}
	fn set_integration(&mut self, node: usize, value: u32) {
		self.integration.set_value(node, value);
	}
}

/// Read-only view used to query directions once a wave has settled
pub struct SettledSectorFields<'a> {
	/// Costs used for the flank rule
	pub cost: &'a CostField,
	/// Settled values
	pub integration: &'a IntegrationField,
}

impl IntegrationGrid for SettledSectorFields<'_> {
	type Node = usize;
	fn get_neighbour(&self, node: usize, ordinal: Ordinal) -> Option<usize> {
		let resolution = self.cost.get_resolution();
		let cell = FieldCell::from_index(node, resolution);
		let next = cell.as_ivec2() + ordinal.to_offset();
		FieldCell::from_ivec2(next, resolution).map(|c| c.get_index(resolution))
	}
	fn get_cost(&self, node: usize) -> u32 {
		self.cost.get_value(node)
	}
	fn get_integration(&self, node: usize) -> u32 {
		self.integration.get_value(node)
	}
	fn set_integration(&mut self, _node: usize, _value: u32) {
		// settled fields are only read
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;

	/// Run a wave over a square cost field
	fn integrate(cost: &CostField, target: FieldCell) -> IntegrationField {
		let resolution = cost.get_resolution();
		let mut integration = IntegrationField::new(resolution);
		let mut fields = SectorFields {
			cost,
			integration: &mut integration,
		};
		propagate_integration(&mut fields, target.get_index(resolution));
		integration
	}

	#[test]
	fn target_is_zero() {
		let cost = CostField::new(5);
		let target = FieldCell::new(2, 2);
		let integration = integrate(&cost, target);
		assert_eq!(0, integration.get_field_cell_value(target));
	}
	#[test]
	fn uniform_field_grows_with_distance() {
		let cost = CostField::new(9);
		let target = FieldCell::new(4, 4);
		let integration = integrate(&cost, target);
		for index in 0..81 {
			let cell = FieldCell::from_index(index, 9);
			let dx = (cell.get_column() as i32 - 4).abs();
			let dy = (cell.get_row() as i32 - 4).abs();
			// orthogonal and diagonal moves cost the same per axis step
			assert_eq!((dx + dy) as u32, integration.get_value(index));
		}
	}
	#[test]
	fn wall_is_never_reached() {
		// ___________________
		// |  1 |  1 |  1 |  1 |
		// |____|____|____|____|
		// |  1 | MAX| MAX|  1 |
		// |____|____|____|____|
		// |  1 |  1 |  T |  1 |
		// |____|____|____|____|
		let mut cost = CostField::new(4);
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(1, 1));
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(2, 1));
		let integration = integrate(&cost, FieldCell::new(2, 2));
		assert_eq!(IMPASSABLE, integration.get_field_cell_value(FieldCell::new(1, 1)));
		assert_eq!(IMPASSABLE, integration.get_field_cell_value(FieldCell::new(2, 1)));
		// around the wall through (3, 1)
		assert_eq!(3, integration.get_field_cell_value(FieldCell::new(3, 0)));
		assert_eq!(4, integration.get_field_cell_value(FieldCell::new(2, 0)));
	}
	#[test]
	fn enclosed_cell_stays_unreached() {
		let mut cost = CostField::new(3);
		for (c, r) in [(1, 0), (0, 1), (2, 1), (1, 2), (0, 0), (2, 0), (0, 2), (2, 2)] {
			cost.set_field_cell_value(IMPASSABLE, FieldCell::new(c, r));
		}
		let integration = integrate(&cost, FieldCell::new(1, 1));
		let reached = integration.get().iter().filter(|v| **v < IMPASSABLE).count();
		assert_eq!(1, reached);
	}
	#[test]
	fn diagonal_blocked_when_both_flanks_blocked() {
		// __________
		// | S  | MAX|
		// |____|____|
		// | MAX|  T |
		// |____|____|
		let mut cost = CostField::new(2);
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(1, 0));
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(0, 1));
		let integration = integrate(&cost, FieldCell::new(1, 1));
		assert_eq!(IMPASSABLE, integration.get_field_cell_value(FieldCell::new(0, 0)));
	}
	#[test]
	fn diagonal_open_with_one_flank() {
		let mut cost = CostField::new(2);
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(1, 0));
		let integration = integrate(&cost, FieldCell::new(1, 1));
		assert_eq!(2, integration.get_field_cell_value(FieldCell::new(0, 0)));
	}
	#[test]
	fn lowest_neighbour_descends() {
		let mut cost = CostField::new(6);
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(2, 2));
		cost.set_field_cell_value(IMPASSABLE, FieldCell::new(3, 2));
		let integration = integrate(&cost, FieldCell::new(5, 5));
		let settled = SettledSectorFields {
			cost: &cost,
			integration: &integration,
		};
		for index in 0..36 {
			let value = integration.get_value(index);
			match lowest_neighbour(&settled, index) {
				Some((_, next)) => assert!(integration.get_value(next) < value),
				None => assert!(value == 0 || value == IMPASSABLE),
			}
		}
	}
}
