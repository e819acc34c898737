//! Per-cell pathfinding over the generated world. Coordinates outside of any
//! registered sector are treated as blocked
//!

use bevy::prelude::*;

use super::*;
use crate::prelude::*;

impl SearchGrid for NavigationWorld {
	type Payload = Cell;
	fn lookup(&self, coord: IVec2) -> Option<&Cell> {
		self.get_cell(coord)
	}
	fn is_walkable(&self, payload: &Cell) -> bool {
		payload.is_walkable()
	}
}

/// Options of a per-cell search bounded by the configured budget
pub fn cell_search_options<'a>(world: &NavigationWorld) -> SearchOptions<'a, Cell> {
	SearchOptions::new(world.get_config().get_cell_search_max_iterations())
}

/// Find a path of grid coordinates between two cells with the default unit
/// step cost and corner-safe diagonals
pub fn find_cell_path(world: &NavigationWorld, start: IVec2, end: IVec2) -> Option<Vec<IVec2>> {
	find_path(start, end, world, &cell_search_options(world))
}

/// Cost of a vehicle stepping between two cells. Driving along a road is
/// free, leaving the road network is penalised
pub fn vehicle_step_cost(world: &NavigationWorld, from: IVec2, to: IVec2) -> f32 {
	let on_road = |coord: IVec2| world.get_cell(coord).is_some_and(|cell| cell.has_road());
	if on_road(to) {
		0.0
	} else if on_road(from) {
		4.0
	} else {
		3.0
	}
}

/// Vehicles cannot drive through buildings or over rails
pub fn is_drivable(cell: &Cell) -> bool {
	!matches!(
		cell.get_occupant(),
		Some(CellOccupant::Structure(_)) | Some(CellOccupant::Rail)
	)
}

/// Find a route for a single vehicle. Roads are strongly preferred and no
/// diagonal is taken while on a road so vehicles follow its lanes
pub fn find_vehicle_path(world: &NavigationWorld, start: IVec2, end: IVec2) -> Option<Vec<IVec2>> {
	let step_cost = |from: IVec2, to: IVec2| vehicle_step_cost(world, from, to);
	let drivable = |cell: &Cell| is_drivable(cell);
	let off_road = |cell: &Cell| !cell.has_road();
	let options = cell_search_options(world)
		.with_step_cost(&step_cost)
		.with_walkable(&drivable)
		.with_diagonals(&off_road);
	find_path(start, end, world, &options)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// A single sector world of resolution 8
	fn world() -> NavigationWorld {
		let mut world = NavigationWorld::new(NavigationConfig::new(8, 1.0));
		world.generate_sector(SectorID::new(0, 0));
		world
	}

	#[test]
	fn path_around_building() {
		let mut world = world();
		for y in 0..6 {
			world
				.set_cell_occupant(IVec2::new(4, y), Some(CellOccupant::Structure(1)))
				.unwrap();
		}
		let path = find_cell_path(&world, IVec2::new(1, 1), IVec2::new(6, 1)).unwrap();
		assert_eq!(IVec2::new(1, 1), path[0]);
		assert_eq!(IVec2::new(6, 1), *path.last().unwrap());
		assert!(path.iter().all(|c| world.is_walkable(*c)));
		assert!(path.iter().any(|c| c.y >= 6));
	}
	#[test]
	fn outside_world_is_blocked() {
		let world = world();
		assert!(find_cell_path(&world, IVec2::new(0, 0), IVec2::new(-3, 0)).is_none());
	}
	#[test]
	fn path_crosses_sector_border() {
		let mut world = world();
		world.generate_sector(SectorID::new(1, 0));
		let path = find_cell_path(&world, IVec2::new(6, 3), IVec2::new(10, 3)).unwrap();
		assert_eq!(5, path.len());
	}
	#[test]
	fn path_onto_building() {
		let mut world = world();
		world
			.set_cell_occupant(IVec2::new(5, 5), Some(CellOccupant::Structure(9)))
			.unwrap();
		let path = find_cell_path(&world, IVec2::new(0, 5), IVec2::new(5, 5)).unwrap();
		assert_eq!(IVec2::new(5, 5), *path.last().unwrap());
	}
	#[test]
	fn vehicle_prefers_road() {
		//  row 0: road along the top edge
		//  row 2: start and end, direct but off-road
		let mut world = world();
		for x in 0..8 {
			world.set_cell_road(IVec2::new(x, 0), true).unwrap();
		}
		let path = find_vehicle_path(&world, IVec2::new(0, 2), IVec2::new(7, 2)).unwrap();
		assert!(path.iter().filter(|c| c.y == 0).count() >= 4);
	}
	#[test]
	fn vehicle_avoids_rails() {
		let mut world = world();
		for y in 0..8 {
			if y != 7 {
				world
					.set_cell_occupant(IVec2::new(3, y), Some(CellOccupant::Rail))
					.unwrap();
			}
		}
		let path = find_vehicle_path(&world, IVec2::new(0, 0), IVec2::new(6, 0)).unwrap();
		assert!(path.contains(&IVec2::new(3, 7)));
		// walkers can cross the rails directly
		let walk = find_cell_path(&world, IVec2::new(0, 0), IVec2::new(6, 0)).unwrap();
		assert_eq!(7, walk.len());
	}
}
