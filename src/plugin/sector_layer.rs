//! Logic for keeping the [NavigationWorld] in step with world generation.
//! Sectors are registered and removed as the world grows or is torn down,
//! and the content of individual cells changes as things are built
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A freshly generated sector and the content of its cells
#[derive(Event, Debug, Clone)]
pub struct EventSectorCreated {
	/// Position of the sector in the grid of sectors
	sector_id: SectorID,
	/// Cells of the sector, row by row
	cells: Vec<Cell>,
}

impl EventSectorCreated {
	/// Create a new instance of [EventSectorCreated]
	pub fn new(sector_id: SectorID, cells: Vec<Cell>) -> Self {
		EventSectorCreated { sector_id, cells }
	}
	pub fn get_sector_id(&self) -> SectorID {
		self.sector_id
	}
	pub fn get_cells(&self) -> &[Cell] {
		&self.cells
	}
}

/// A sector has been torn down
#[derive(Event, Debug, Clone, Copy)]
pub struct EventSectorRemoved {
	/// The sector to remove
	sector_id: SectorID,
}

impl EventSectorRemoved {
	/// Create a new instance of [EventSectorRemoved]
	pub fn new(sector_id: SectorID) -> Self {
		EventSectorRemoved { sector_id }
	}
	pub fn get_sector_id(&self) -> SectorID {
		self.sector_id
	}
}

/// What changed on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellChange {
	/// Place content on the cell, [None] clears it
	Occupant(Option<CellOccupant>),
	/// Lay or remove a road
	Road(bool),
}

/// Used to update the content of a cell
#[derive(Event, Debug, Clone, Copy)]
pub struct EventUpdateCell {
	/// Grid coordinate of the cell
	grid_coord: IVec2,
	/// The change to apply
	change: CellChange,
}

impl EventUpdateCell {
	/// Place content on a cell, [None] clears it
	pub fn new(grid_coord: IVec2, occupant: Option<CellOccupant>) -> Self {
		EventUpdateCell {
			grid_coord,
			change: CellChange::Occupant(occupant),
		}
	}
	/// Lay or remove a road on a cell
	pub fn road(grid_coord: IVec2, road: bool) -> Self {
		EventUpdateCell {
			grid_coord,
			change: CellChange::Road(road),
		}
	}
	pub fn get_grid_coord(&self) -> IVec2 {
		self.grid_coord
	}
	pub fn get_change(&self) -> CellChange {
		self.change
	}
}

/// Register and remove sectors, the address cache is invalidated once per
/// batch of changes
#[cfg(not(tarpaulin_include))]
pub fn process_sector_lifecycle(
	mut created: EventReader<EventSectorCreated>,
	mut removed: EventReader<EventSectorRemoved>,
	mut world: ResMut<NavigationWorld>,
) {
	let mut changed = false;
	for event in created.read() {
		let map_res = world.get_map_res();
		let Some(sector) = Sector::from_cells(event.get_cells().to_vec(), map_res) else {
			error!(
				"Sector {:?} was not registered, its cells do not fit a resolution of {}",
				event.get_sector_id(),
				map_res
			);
			continue;
		};
		match world.register_sector(event.get_sector_id(), sector) {
			Ok(()) => changed = true,
			Err(e) => error!("{}", e),
		}
	}
	for event in removed.read() {
		if world.remove_sector(&event.get_sector_id()).is_some() {
			changed = true;
		} else {
			debug!("Sector {:?} was already removed", event.get_sector_id());
		}
	}
	if changed {
		world.invalidate_cache();
	}
}

/// Apply [EventUpdateCell] to the owning sectors
#[cfg(not(tarpaulin_include))]
pub fn process_cell_updates(
	mut events: EventReader<EventUpdateCell>,
	mut world: ResMut<NavigationWorld>,
) {
	for event in events.read() {
		let result = match event.get_change() {
			CellChange::Occupant(occupant) => world.set_cell_occupant(event.get_grid_coord(), occupant),
			CellChange::Road(road) => world.set_cell_road(event.get_grid_coord(), road),
		};
		if let Err(e) = result {
			error!("Cell update ignored: {}", e);
		}
	}
}
