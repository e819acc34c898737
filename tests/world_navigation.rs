//! Drive the navigation core through the prelude the way a game would:
//! generate sectors, place content, search and steer
//!

use bevy::prelude::*;
use bevy_sector_navigation::prelude::*;

/// World of resolution 4 with the given sectors generated
fn world_with(sectors: &[(i32, i32)]) -> NavigationWorld {
	let mut world = NavigationWorld::new(NavigationConfig::new(4, 1.0));
	for (column, row) in sectors {
		world.generate_sector(SectorID::new(*column, *row));
	}
	world
}

/// Block a vertical line of cells at column `x` over `rows`
fn wall(world: &mut NavigationWorld, x: i32, rows: std::ops::Range<i32>) {
	for y in rows {
		world
			.set_cell_occupant(IVec2::new(x, y), Some(CellOccupant::Structure(1)))
			.unwrap();
	}
}

/// Follow corridor directions from `start` until none is given
fn walk(corridor: &FlowFieldCorridor, start: IVec2, max_steps: usize) -> Vec<IVec2> {
	let mut visited = vec![start];
	let mut current = start;
	while let Some(ordinal) = corridor.direction_ordinal(current) {
		current += ordinal.to_offset();
		visited.push(current);
		if visited.len() > max_steps {
			break;
		}
	}
	visited
}

#[test]
fn path_crosses_sector_boundary() {
	let world = world_with(&[(0, 0), (1, 0)]);
	let path = find_cell_path(&world, IVec2::ZERO, IVec2::new(7, 0)).unwrap();
	assert_eq!(Some(&IVec2::ZERO), path.first());
	assert_eq!(Some(&IVec2::new(7, 0)), path.last());
	assert_eq!(8, path.len());
	for step in path.windows(2) {
		let delta = (step[1] - step[0]).abs();
		assert_eq!(1, delta.max_element());
	}
}

#[test]
fn path_detours_through_neighbouring_sector() {
	let mut world = world_with(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
	wall(&mut world, 4, 0..4);
	let path = find_cell_path(&world, IVec2::ZERO, IVec2::new(7, 0)).unwrap();
	assert!(path.iter().any(|coord| coord.y >= 4));
	assert!(path.iter().all(|coord| world.is_walkable(*coord)));
}

#[test]
fn sealed_goal_reports_no_path() {
	let mut world = world_with(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
	wall(&mut world, 4, 0..8);
	let options = cell_search_options(&world);
	let result = try_find_path(IVec2::ZERO, IVec2::new(7, 0), &world, &options);
	assert_eq!(Err(SearchError::NoPathFound), result);
}

#[test]
fn diagonal_between_two_buildings_is_refused() {
	let mut world = world_with(&[(0, 0)]);
	world
		.set_cell_occupant(IVec2::new(1, 0), Some(CellOccupant::Structure(2)))
		.unwrap();
	world
		.set_cell_occupant(IVec2::new(0, 1), Some(CellOccupant::Structure(3)))
		.unwrap();
	assert!(find_cell_path(&world, IVec2::ZERO, IVec2::ONE).is_none());
	let options = cell_search_options(&world).with_diagonal_policy(DiagonalPolicy::Unrestricted);
	let path = try_find_path(IVec2::ZERO, IVec2::ONE, &world, &options).unwrap();
	assert_eq!(vec![IVec2::ZERO, IVec2::ONE], path);
}

#[test]
fn regenerated_sector_is_resolved_afresh() {
	let mut world = world_with(&[(0, 0), (1, 0)]);
	let coord = IVec2::new(5, 0);
	assert!(world.get_cell(coord).is_some());
	world.remove_sector(&SectorID::new(1, 0));
	assert!(world.get_cell(coord).is_none());
	let mut cells = vec![Cell::default(); 16];
	cells[1] = Cell::with_occupant(CellOccupant::Conveyor);
	let sector = Sector::from_cells(cells, 4).unwrap();
	world.register_sector(SectorID::new(1, 0), sector).unwrap();
	let cell = world.get_cell(coord).unwrap();
	assert_eq!(Some(CellOccupant::Conveyor), cell.get_occupant());
	assert!(!world.is_walkable(coord));
}

#[test]
fn sector_flow_field_leads_to_target() {
	let mut world = world_with(&[(0, 0)]);
	wall(&mut world, 2, 0..3);
	world.compute_flow_field(IVec2::new(3, 0)).unwrap();
	let mut current = IVec2::ZERO;
	for _ in 0..16 {
		let Some(direction) = world.direction(current) else {
			break;
		};
		current += direction.round().as_ivec2();
		assert!(world.is_walkable(current));
	}
	assert_eq!(IVec2::new(3, 0), current);
}

#[test]
fn corridor_guides_around_wall() {
	let mut world = world_with(&[(0, 0), (1, 0), (2, 0)]);
	wall(&mut world, 5, 0..3);
	let target = IVec2::new(10, 0);
	let sectors = select_corridor(&world, IVec2::ZERO, target).unwrap();
	assert_eq!(
		vec![SectorID::new(0, 0), SectorID::new(1, 0), SectorID::new(2, 0)],
		sectors
	);
	let corridor = FlowFieldCorridor::compute(&world, target, &sectors, default_cost).unwrap();
	assert_eq!(Some(0), corridor.get_integration_value(target));
	assert_eq!(Some(IMPASSABLE), corridor.get_integration_value(IVec2::new(5, 0)));
	let visited = walk(&corridor, IVec2::ZERO, 32);
	assert_eq!(Some(&target), visited.last());
	assert!(visited.contains(&IVec2::new(5, 3)));
	assert!(corridor.direction(IVec2::new(0, 4)).is_none());
}

#[test]
fn corridor_reaches_building_entrance() {
	let mut world = world_with(&[(0, 0), (1, 0)]);
	for y in 1..3 {
		for x in 5..7 {
			world
				.set_cell_occupant(IVec2::new(x, y), Some(CellOccupant::Structure(9)))
				.unwrap();
		}
	}
	let destination = IVec2::new(6, 2);
	let sectors = select_corridor(&world, IVec2::ZERO, destination).unwrap();
	let cell = *world.get_cell(destination).unwrap();
	let corridor =
		FlowFieldCorridor::compute(&world, destination, &sectors, destination_cost(cell)).unwrap();
	let visited = walk(&corridor, IVec2::new(0, 1), 32);
	assert_eq!(Some(&destination), visited.last());
}
