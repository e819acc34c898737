//! A group of units heading to one destination shares a single integration
//! field spanning every sector they are expected to cross, the corridor.
//!
//! The corridor is chosen by a per-cell search without diagonals from the
//! lead unit to the destination, collecting the sectors that path crosses:
//!
//! ```text
//!  _______________ _______________
//! |               |               |
//! |   U . . . . . | . . .         |
//! |             (0,0)   .  (1,0)  |
//! |_______________|_____._________|
//! |               |     .         |
//! |               |     . D       |
//! |             (0,1)      (1,1)  |
//! |_______________|_______________|
//!
//!  corridor: (0,0) -> (1,0) -> (1,1)
//! ```
//!
//! When no cell path exists the coarse sector search decides the corridor
//! instead. A wave is then relaxed over the corridor only, cells of sectors
//! outside of it are never visited. A unit of the group found outside of the
//! corridor grows it by the sector it stands in and the wave is relaxed
//! again.
//!

use std::collections::HashMap;

use bevy::prelude::*;

use crate::prelude::*;

/// The cost of a cell as seen by the wave, before any corridor adjustment
pub fn default_cost(cell: &Cell) -> u32 {
	cell.get_flow_field_cost()
}

/// Whether `cell` belongs to the same building or resource deposit as the
/// destination cell
fn is_part_of_destination(destination: &Cell, cell: &Cell) -> bool {
	if let Some(kind) = destination.get_resource() {
		cell.get_resource() == Some(kind)
	} else if let Some(id) = destination.get_structure() {
		cell.get_structure() == Some(id)
	} else {
		false
	}
}

/// Walking cost of `cell` when heading to `destination`
fn walking_cell_cost(destination: &Cell, cell: &Cell) -> u32 {
	if is_part_of_destination(destination, cell) {
		DEFAULT_CELL_COST
	} else {
		default_cost(cell)
	}
}

/// Driving cost of `cell` when heading to `destination`
fn driving_cell_cost(destination: &Cell, penalty: u32, cell: &Cell) -> u32 {
	if cell.has_road() {
		DEFAULT_CELL_COST
	} else {
		walking_cell_cost(destination, cell).saturating_add(penalty)
	}
}

/// Cost of cells for units walking to `destination`. Cells of the
/// destination building or deposit become enterable so the wave can reach
/// the target
pub fn destination_cost(destination: Cell) -> impl Fn(&Cell) -> u32 {
	move |cell: &Cell| walking_cell_cost(&destination, cell)
}

/// Cost of cells for vehicles driving to `destination`. Road cells are
/// cheap, any other cell has `penalty` added
pub fn vehicle_cost(destination: Cell, penalty: u32) -> impl Fn(&Cell) -> u32 {
	move |cell: &Cell| driving_cell_cost(&destination, penalty, cell)
}

/// Which cost function a corridor was relaxed with, kept so the corridor can
/// be grown later with the same costs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CorridorCost {
	/// [default_cost]
	Plain,
	/// [destination_cost] towards the destination cell
	Walking(Cell),
	/// [vehicle_cost] towards the destination cell
	Driving {
		/// Content of the destination cell
		destination: Cell,
		/// Added to every cell off the road network
		penalty: u32,
	},
}

impl CorridorCost {
	/// Cost of a cell as seen by the wave
	pub fn cost(&self, cell: &Cell) -> u32 {
		match self {
			CorridorCost::Plain => default_cost(cell),
			CorridorCost::Walking(destination) => walking_cell_cost(destination, cell),
			CorridorCost::Driving {
				destination,
				penalty,
			} => driving_cell_cost(destination, *penalty, cell),
		}
	}
}

/// Walkability used while choosing a corridor, the destination building or
/// deposit may be walked into
fn corridor_walkable(destination: &Cell, cell: &Cell) -> bool {
	match cell.get_occupant() {
		Some(CellOccupant::Structure(id)) => destination.get_structure() == Some(id),
		Some(CellOccupant::Resource(kind)) => destination.get_resource() == Some(kind),
		_ => cell.is_walkable(),
	}
}

/// Choose the ordered list of sectors a unit at `from` should cross to reach
/// `destination`. The unit's own sector always comes first and no sector is
/// listed twice
pub fn select_corridor(
	world: &NavigationWorld,
	from: IVec2,
	destination: IVec2,
) -> Option<Vec<SectorID>> {
	let (start_sector, _) = world.get_sector_and_local(from);
	let destination_cell = world.get_cell(destination).copied();
	let options = cell_search_options(world).with_diagonal_policy(DiagonalPolicy::Disabled);
	let walkable;
	let options = match destination_cell {
		Some(cell) if cell.get_structure().is_some() || cell.get_resource().is_some() => {
			walkable = move |c: &Cell| corridor_walkable(&cell, c);
			options.with_walkable(&walkable)
		}
		_ => options,
	};
	match find_path(from, destination, world, &options) {
		Some(cell_path) => {
			let mut sectors = vec![start_sector];
			for coord in cell_path {
				let (sector, _) = world.get_sector_and_local(coord);
				if !sectors.contains(&sector) {
					sectors.push(sector);
				}
			}
			Some(sectors)
		}
		None => {
			let (end_sector, _) = world.get_sector_and_local(destination);
			debug!(
				"No cell path from {} to {}, routing over sectors {:?} -> {:?}",
				from, destination, start_sector, end_sector
			);
			find_sector_path(world, start_sector, end_sector)
		}
	}
}

/// Integration values spanning several sectors, all relaxed from one
/// target cell
#[derive(Clone, Debug)]
pub struct FlowFieldCorridor {
	/// Cells per sector edge
	map_res: usize,
	/// Grid coordinate every direction leads to
	target: IVec2,
	/// Sectors in travel order
	sectors: Vec<SectorID>,
	/// Costs seen by the wave, per sector
	costs: HashMap<SectorID, CostField>,
	/// Settled values, per sector
	integration: HashMap<SectorID, IntegrationField>,
}

impl FlowFieldCorridor {
	/// Relax a wave from `target` across `sectors`, the cost of each cell is
	/// decided by `cost_fn`. Listed sectors that are not generated are
	/// skipped. Returns [None] if the target is outside the generated world
	pub fn compute(
		world: &NavigationWorld,
		target: IVec2,
		sectors: &[SectorID],
		cost_fn: impl Fn(&Cell) -> u32,
	) -> Option<Self> {
		let address = world.resolve(target);
		if address.cell.is_none() {
			error!("Flow field target {} is outside of the generated world", target);
			return None;
		}
		let map_res = world.get_map_res();
		let mut corridor = FlowFieldCorridor {
			map_res,
			target,
			sectors: Vec::with_capacity(sectors.len() + 1),
			costs: HashMap::new(),
			integration: HashMap::new(),
		};
		let target_listed = sectors.contains(&address.sector_id);
		let ids = sectors
			.iter()
			.copied()
			.chain((!target_listed).then_some(address.sector_id));
		for sector_id in ids {
			if !corridor.costs.contains_key(&sector_id) {
				corridor.insert_sector(world, sector_id, &cost_fn);
			}
		}
		propagate_integration(&mut corridor, target);
		Some(corridor)
	}
	/// Copy the costs of a generated sector into the corridor with unreached
	/// integration values. Returns `false` if the sector is not generated
	fn insert_sector(
		&mut self,
		world: &NavigationWorld,
		sector_id: SectorID,
		cost_fn: &impl Fn(&Cell) -> u32,
	) -> bool {
		let Some(sector) = world.get_sector(&sector_id) else {
			debug!("Corridor sector {:?} is not generated, skipping", sector_id);
			return false;
		};
		let mut costs = CostField::new(self.map_res);
		for (index, cell) in sector.get_cells().iter().enumerate() {
			costs.set_value(index, cost_fn(cell));
		}
		self.costs.insert(sector_id, costs);
		self.integration
			.insert(sector_id, IntegrationField::new(self.map_res));
		self.sectors.push(sector_id);
		true
	}
	/// Grow the corridor by the sector holding `grid_coord` and relax the
	/// wave again from the target so values flow into the new sector.
	/// Returns `false` if that sector is not generated. A coordinate already
	/// covered leaves the corridor untouched
	pub fn extend(
		&mut self,
		world: &NavigationWorld,
		grid_coord: IVec2,
		cost_fn: impl Fn(&Cell) -> u32,
	) -> bool {
		if self.contains(grid_coord) {
			return true;
		}
		let sector_id = SectorID::from(floor_div(grid_coord, self.map_res as i32));
		if !self.insert_sector(world, sector_id, &cost_fn) {
			return false;
		}
		debug!("Corridor towards {} grown by sector {:?}", self.target, sector_id);
		for field in self.integration.values_mut() {
			field.reset();
		}
		let target = self.target;
		propagate_integration(self, target);
		true
	}
	pub fn get_target(&self) -> IVec2 {
		self.target
	}
	/// Sectors covered, in travel order
	pub fn get_sectors(&self) -> &[SectorID] {
		&self.sectors
	}
	/// Whether a grid coordinate lies within the corridor
	pub fn contains(&self, grid_coord: IVec2) -> bool {
		self.split(grid_coord).is_some()
	}
	/// Sector and flat cell index of a grid coordinate if it is covered
	fn split(&self, grid_coord: IVec2) -> Option<(SectorID, usize)> {
		let res = self.map_res as i32;
		let sector = floor_div(grid_coord, res);
		let local = grid_coord - sector * res;
		let sector_id = SectorID::from(sector);
		if self.costs.contains_key(&sector_id) {
			Some((sector_id, (local.y * res + local.x) as usize))
		} else {
			None
		}
	}
	/// Integration value of a grid coordinate, [None] outside of the corridor
	pub fn get_integration_value(&self, grid_coord: IVec2) -> Option<u32> {
		let (sector_id, index) = self.split(grid_coord)?;
		Some(self.integration.get(&sector_id)?.get_value(index))
	}
	/// Integration field of one sector of the corridor
	pub fn get_integration_field(&self, sector_id: &SectorID) -> Option<&IntegrationField> {
		self.integration.get(sector_id)
	}
	/// Whether the wave reached a grid coordinate
	pub fn is_reached(&self, grid_coord: IVec2) -> bool {
		self.get_integration_value(grid_coord)
			.is_some_and(|value| value < IMPASSABLE)
	}
	/// Unit vector to steer along from a grid coordinate. [None] at the
	/// target, outside of the corridor and at blocked or unreached cells
	pub fn direction(&self, grid_coord: IVec2) -> Option<Vec2> {
		self.direction_ordinal(grid_coord)
			.map(|ordinal| ordinal.to_unit_vector())
	}
	/// [Ordinal] to step in from a grid coordinate
	pub fn direction_ordinal(&self, grid_coord: IVec2) -> Option<Ordinal> {
		if !self.is_reached(grid_coord) {
			return None;
		}
		lowest_neighbour(self, grid_coord).map(|(ordinal, _)| ordinal)
	}
}

impl IntegrationGrid for FlowFieldCorridor {
	type Node = IVec2;
	fn get_neighbour(&self, node: IVec2, ordinal: Ordinal) -> Option<IVec2> {
		let next = node + ordinal.to_offset();
		self.split(next).map(|_| next)
	}
	fn get_cost(&self, node: IVec2) -> u32 {
		self.split(node)
			.and_then(|(sector_id, index)| self.costs.get(&sector_id).map(|c| c.get_value(index)))
			.unwrap_or(IMPASSABLE)
	}
	fn get_integration(&self, node: IVec2) -> u32 {
		self.get_integration_value(node).unwrap_or(IMPASSABLE)
	}
	fn set_integration(&mut self, node: IVec2, value: u32) {
		if let Some((sector_id, index)) = self.split(node) {
			if let Some(field) = self.integration.get_mut(&sector_id) {
				field.set_value(index, value);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// World of resolution 4 with sectors at the given IDs
	fn world_with(sectors: &[(i32, i32)]) -> NavigationWorld {
		let mut world = NavigationWorld::new(NavigationConfig::new(4, 1.0));
		for (c, r) in sectors {
			world.generate_sector(SectorID::new(*c, *r));
		}
		world
	}

	#[test]
	fn corridor_follows_cell_path() {
		let world = world_with(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
		let sectors = select_corridor(&world, IVec2::new(1, 1), IVec2::new(6, 6)).unwrap();
		assert_eq!(SectorID::new(0, 0), sectors[0]);
		assert_eq!(SectorID::new(1, 1), *sectors.last().unwrap());
		assert_eq!(3, sectors.len());
	}
	#[test]
	fn corridor_into_destination_building() {
		let mut world = world_with(&[(0, 0)]);
		for coord in [IVec2::new(2, 1), IVec2::new(3, 1), IVec2::new(2, 2), IVec2::new(3, 2)] {
			world
				.set_cell_occupant(coord, Some(CellOccupant::Structure(4)))
				.unwrap();
		}
		let sectors = select_corridor(&world, IVec2::new(0, 0), IVec2::new(3, 2)).unwrap();
		assert_eq!(vec![SectorID::new(0, 0)], sectors);
	}
	#[test]
	fn corridor_falls_back_to_sectors() {
		// a wall of conveyors seals the destination off at cell level
		let mut world = world_with(&[(0, 0), (1, 0)]);
		for y in 0..4 {
			world
				.set_cell_occupant(IVec2::new(4, y), Some(CellOccupant::Conveyor))
				.unwrap();
		}
		let sectors = select_corridor(&world, IVec2::new(0, 0), IVec2::new(6, 2)).unwrap();
		assert_eq!(vec![SectorID::new(0, 0), SectorID::new(1, 0)], sectors);
	}
	#[test]
	fn corridor_wave_crosses_sectors() {
		let world = world_with(&[(0, 0), (1, 0), (2, 0)]);
		let sectors = vec![SectorID::new(0, 0), SectorID::new(1, 0)];
		let corridor =
			FlowFieldCorridor::compute(&world, IVec2::new(7, 0), &sectors, default_cost).unwrap();
		assert_eq!(Some(0), corridor.get_integration_value(IVec2::new(7, 0)));
		assert_eq!(Some(7), corridor.get_integration_value(IVec2::new(0, 0)));
		// sector (2, 0) is not part of the corridor
		assert!(corridor.get_integration_value(IVec2::new(8, 0)).is_none());
		assert_eq!(Some(Vec2::new(1.0, 0.0)), corridor.direction(IVec2::new(3, 0)));
		assert!(corridor.direction(IVec2::new(7, 0)).is_none());
	}
	#[test]
	fn corridor_target_outside_world() {
		let world = world_with(&[(0, 0)]);
		let sectors = vec![SectorID::new(0, 0)];
		assert!(FlowFieldCorridor::compute(&world, IVec2::new(-1, 0), &sectors, default_cost).is_none());
	}
	#[test]
	fn target_sector_always_included() {
		let world = world_with(&[(0, 0), (1, 0)]);
		let sectors = vec![SectorID::new(0, 0)];
		let corridor =
			FlowFieldCorridor::compute(&world, IVec2::new(5, 1), &sectors, default_cost).unwrap();
		assert_eq!(2, corridor.get_sectors().len());
		assert!(corridor.direction(IVec2::new(0, 1)).is_some());
	}
	#[test]
	fn destination_building_is_enterable() {
		let mut world = world_with(&[(0, 0)]);
		world
			.set_cell_occupant(IVec2::new(2, 2), Some(CellOccupant::Structure(5)))
			.unwrap();
		world
			.set_cell_occupant(IVec2::new(3, 2), Some(CellOccupant::Structure(5)))
			.unwrap();
		let destination = *world.get_cell(IVec2::new(3, 2)).unwrap();
		let sectors = vec![SectorID::new(0, 0)];
		let walking = FlowFieldCorridor::compute(
			&world,
			IVec2::new(3, 2),
			&sectors,
			destination_cost(destination),
		)
		.unwrap();
		assert_eq!(Some(1), walking.get_integration_value(IVec2::new(2, 2)));
		let plain =
			FlowFieldCorridor::compute(&world, IVec2::new(3, 2), &sectors, default_cost).unwrap();
		assert_eq!(Some(IMPASSABLE), plain.get_integration_value(IVec2::new(2, 2)));
	}
	#[test]
	fn blocked_cell_has_no_direction() {
		let mut world = world_with(&[(0, 0)]);
		world
			.set_cell_occupant(IVec2::new(1, 0), Some(CellOccupant::Conveyor))
			.unwrap();
		let sectors = vec![SectorID::new(0, 0)];
		let corridor =
			FlowFieldCorridor::compute(&world, IVec2::new(3, 0), &sectors, default_cost).unwrap();
		assert!(!corridor.is_reached(IVec2::new(1, 0)));
		assert!(corridor.direction(IVec2::new(1, 0)).is_none());
		// the single sector engine agrees
		world.compute_flow_field(IVec2::new(3, 0)).unwrap();
		assert!(world.direction(IVec2::new(1, 0)).is_none());
	}
	#[test]
	fn extend_into_neighbouring_sector() {
		//  _______________ _______________
		// |               |               |
		// | . . . . . . . | . . . T       |
		// |             (0,0)      (1,0)  |
		// |_______________|_______________|
		// |               |
		// | U             |
		// |             (0,1)
		// |_______________|
		let world = world_with(&[(0, 0), (1, 0), (0, 1)]);
		let sectors = vec![SectorID::new(0, 0), SectorID::new(1, 0)];
		let mut corridor =
			FlowFieldCorridor::compute(&world, IVec2::new(7, 0), &sectors, default_cost).unwrap();
		let unit = IVec2::new(0, 6);
		assert!(corridor.direction(unit).is_none());
		assert!(corridor.extend(&world, unit, default_cost));
		assert_eq!(3, corridor.get_sectors().len());
		assert!(corridor.direction(unit).is_some());
		assert_eq!(Some(7), corridor.get_integration_value(IVec2::new(0, 0)));
		assert_eq!(Some(0), corridor.get_integration_value(IVec2::new(7, 0)));
	}
	#[test]
	fn extend_into_missing_sector() {
		let world = world_with(&[(0, 0)]);
		let sectors = vec![SectorID::new(0, 0)];
		let mut corridor =
			FlowFieldCorridor::compute(&world, IVec2::new(3, 0), &sectors, default_cost).unwrap();
		assert!(!corridor.extend(&world, IVec2::new(0, 5), default_cost));
		assert_eq!(1, corridor.get_sectors().len());
	}
	#[test]
	fn corridor_cost_matches_functions() {
		let destination = Cell::with_occupant(CellOccupant::Structure(2));
		let part = Cell::with_occupant(CellOccupant::Structure(2));
		let other = Cell::with_occupant(CellOccupant::Structure(8));
		let walking = CorridorCost::Walking(destination);
		assert_eq!(destination_cost(destination)(&part), walking.cost(&part));
		assert_eq!(IMPASSABLE, walking.cost(&other));
		let driving = CorridorCost::Driving {
			destination,
			penalty: 10,
		};
		assert_eq!(11, driving.cost(&Cell::default()));
		assert_eq!(DEFAULT_CELL_COST, CorridorCost::Plain.cost(&Cell::default()));
	}
	#[test]
	fn vehicles_prefer_roads() {
		let mut cell = Cell::default();
		let cost = vehicle_cost(Cell::default(), 10);
		assert_eq!(11, cost(&cell));
		cell.set_road(true);
		assert_eq!(1, cost(&cell));
		let blocked = Cell::with_occupant(CellOccupant::Conveyor);
		assert!(cost(&blocked) >= IMPASSABLE);
	}
}
