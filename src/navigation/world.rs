//! The [NavigationWorld] is the spatial index of the grid. It owns every
//! registered [Sector] and converts between continuous world positions,
//! absolute grid coordinates and `(sector, local cell)` addresses.
//!
//! Grid coordinates are unbounded and may be negative, the sector holding a
//! coordinate is found by floor division with `map_res`:
//!
//! ```text
//!            x: -2   -1  |  0    1
//!              ______________________
//!   y: -1     |    |    ||    |    |
//!             |____|____||____|____|
//!   y:  0     |    |    ||    |    |
//!             |____|____||____|____|
//!               sector     sector
//!               (-1, _)    (0, _)
//! ```
//!
//! Resolved addresses are memoised. Registering a sector never needs the
//! memo cleared as only successful lookups are stored, removing a sector
//! evicts the entries pointing into it.
//!

use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
};

use bevy::prelude::*;

use crate::prelude::*;

/// The address of a grid coordinate, cell-free so it can be memoised
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CachedAddress {
	/// Owning sector
	sector_id: SectorID,
	/// Position within the sector
	local: FieldCell,
	/// Flat index of `local`
	cell_index: usize,
}

/// Result of resolving a grid coordinate. When no sector is registered at
/// the coordinate `cell` is [None] while the sector and local coordinates
/// are still populated, callers may use them to decide whether to generate
/// the sector
#[derive(Clone, Copy, Debug)]
pub struct CellAddress<'a> {
	/// The cell, [None] outside of the generated world
	pub cell: Option<&'a Cell>,
	/// Sector the coordinate falls into
	pub sector_id: SectorID,
	/// Coordinate within the sector
	pub local: FieldCell,
	/// Flat index of `local` within the sector's fields
	pub cell_index: usize,
}

/// Registry of sectors along with the conversions between world space, grid
/// coordinates and sector addresses
#[derive(Resource, Debug)]
pub struct NavigationWorld {
	/// Grid resolution and search budgets
	config: NavigationConfig,
	/// Every generated sector
	sectors: HashMap<SectorID, Sector>,
	/// Memo of resolved grid coordinates
	cache: Mutex<HashMap<IVec2, CachedAddress>>,
}

impl Default for NavigationWorld {
	fn default() -> Self {
		NavigationWorld::new(NavigationConfig::default())
	}
}

impl NavigationWorld {
	/// Create a new, empty [NavigationWorld]
	pub fn new(config: NavigationConfig) -> Self {
		NavigationWorld {
			config,
			sectors: HashMap::new(),
			cache: Mutex::new(HashMap::new()),
		}
	}
	pub fn get_config(&self) -> &NavigationConfig {
		&self.config
	}
	pub fn get_map_res(&self) -> usize {
		self.config.get_map_res()
	}
	/// Lock the memo, a poisoned lock only means a panic happened while
	/// inserting so the map itself is still usable
	fn lock_cache(&self) -> MutexGuard<'_, HashMap<IVec2, CachedAddress>> {
		self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
	/// Number of memoised coordinates
	pub fn get_cache_len(&self) -> usize {
		self.lock_cache().len()
	}
	/// Convert a world position on the `x`/`z` ground plane into a grid
	/// coordinate. The world origin sits in the middle of sector `(0, 0)`
	pub fn world_to_grid(&self, position: Vec3) -> IVec2 {
		let cell_size = self.config.get_cell_size();
		let half_res = (self.config.get_map_res() / 2) as i32;
		IVec2::new(
			(position.x / cell_size).floor() as i32 + half_res,
			(position.z / cell_size).floor() as i32 + half_res,
		)
	}
	/// Convert a grid coordinate into the world position of the centre of its
	/// cell, `y` is always `0`
	pub fn grid_to_world(&self, grid_coord: IVec2) -> Vec3 {
		let cell_size = self.config.get_cell_size();
		let offset = -(self.config.get_map_res() as f32 * cell_size) / 2.0;
		Vec3::new(
			grid_coord.x as f32 * cell_size + cell_size / 2.0 + offset,
			0.0,
			grid_coord.y as f32 * cell_size + cell_size / 2.0 + offset,
		)
	}
	/// Split a grid coordinate into its sector and local coordinates without
	/// consulting the registry
	pub fn get_sector_and_local(&self, grid_coord: IVec2) -> (SectorID, FieldCell) {
		let map_res = self.config.get_map_res();
		let sector = floor_div(grid_coord, map_res as i32);
		let local = grid_coord - sector * map_res as i32;
		(
			SectorID::from(sector),
			FieldCell::new(local.x as usize, local.y as usize),
		)
	}
	/// Inverse of [NavigationWorld::get_sector_and_local]
	pub fn get_grid_coord(&self, sector_id: SectorID, local: FieldCell) -> IVec2 {
		sector_id.get_origin(self.config.get_map_res()) + local.as_ivec2()
	}
	/// Find the cell at a grid coordinate along with its address. Every
	/// memoised address points into a registered sector, removing a sector
	/// evicts its addresses
	pub fn resolve(&self, grid_coord: IVec2) -> CellAddress<'_> {
		let cached = self.lock_cache().get(&grid_coord).copied();
		if let Some(address) = cached {
			if let Some(sector) = self.sectors.get(&address.sector_id) {
				return CellAddress {
					cell: sector.get_cell(address.cell_index),
					sector_id: address.sector_id,
					local: address.local,
					cell_index: address.cell_index,
				};
			}
		}
		let (sector_id, local) = self.get_sector_and_local(grid_coord);
		let cell_index = local.get_index(self.config.get_map_res());
		let cell = self
			.sectors
			.get(&sector_id)
			.and_then(|sector| sector.get_cell(cell_index));
		if cell.is_some() {
			self.lock_cache().insert(
				grid_coord,
				CachedAddress {
					sector_id,
					local,
					cell_index,
				},
			);
		}
		CellAddress {
			cell,
			sector_id,
			local,
			cell_index,
		}
	}
	/// Get the cell at a grid coordinate, [None] outside of the generated
	/// world
	pub fn get_cell(&self, grid_coord: IVec2) -> Option<&Cell> {
		self.resolve(grid_coord).cell
	}
	/// A coordinate outside of the generated world is never walkable
	pub fn is_walkable(&self, grid_coord: IVec2) -> bool {
		self.get_cell(grid_coord).is_some_and(|cell| cell.is_walkable())
	}
	/// Clear every memoised address
	pub fn invalidate_cache(&mut self) {
		let cache = self.cache.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
		debug!("Invalidating {} cached cell addresses", cache.len());
		cache.clear();
	}
	pub fn get_sector(&self, sector_id: &SectorID) -> Option<&Sector> {
		self.sectors.get(sector_id)
	}
	pub fn get_sector_mut(&mut self, sector_id: &SectorID) -> Option<&mut Sector> {
		self.sectors.get_mut(sector_id)
	}
	pub fn get_sectors(&self) -> &HashMap<SectorID, Sector> {
		&self.sectors
	}
	pub fn has_sector(&self, sector_id: &SectorID) -> bool {
		self.sectors.contains_key(sector_id)
	}
	/// Add a sector to the registry, replacing any sector previously stored
	/// under the same ID. A sector whose resolution differs from the
	/// configured one is rejected
	pub fn register_sector(
		&mut self,
		sector_id: SectorID,
		sector: Sector,
	) -> Result<(), NavigationError> {
		if sector.get_map_res() != self.config.get_map_res() {
			return Err(NavigationError::InvalidConfig(format!(
				"sector {:?} has resolution {}, the world uses {}",
				sector_id,
				sector.get_map_res(),
				self.config.get_map_res()
			)));
		}
		debug!("Registering sector {:?}", sector_id);
		self.sectors.insert(sector_id, sector);
		Ok(())
	}
	/// Create and register an empty, fully walkable sector
	pub fn generate_sector(&mut self, sector_id: SectorID) -> &mut Sector {
		debug!("Generating sector {:?}", sector_id);
		let map_res = self.config.get_map_res();
		self.sectors
			.entry(sector_id)
			.or_insert_with(|| Sector::new(map_res))
	}
	/// Remove a sector from the registry, any memoised address pointing into
	/// it is evicted
	pub fn remove_sector(&mut self, sector_id: &SectorID) -> Option<Sector> {
		let removed = self.sectors.remove(sector_id)?;
		let cache = self.cache.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
		cache.retain(|_, address| address.sector_id != *sector_id);
		debug!("Removed sector {:?}", sector_id);
		Some(removed)
	}
	/// Place or clear content on the cell at a grid coordinate
	pub fn set_cell_occupant(
		&mut self,
		grid_coord: IVec2,
		occupant: Option<CellOccupant>,
	) -> Result<(), NavigationError> {
		let (sector_id, local) = self.get_sector_and_local(grid_coord);
		let sector = self
			.sectors
			.get_mut(&sector_id)
			.ok_or(NavigationError::OutsideGeneratedWorld(grid_coord))?;
		sector.set_cell_occupant(local, occupant);
		Ok(())
	}
	/// Mark whether a road runs through the cell at a grid coordinate
	pub fn set_cell_road(&mut self, grid_coord: IVec2, road: bool) -> Result<(), NavigationError> {
		let (sector_id, local) = self.get_sector_and_local(grid_coord);
		let sector = self
			.sectors
			.get_mut(&sector_id)
			.ok_or(NavigationError::OutsideGeneratedWorld(grid_coord))?;
		sector.set_cell_road(local, road);
		Ok(())
	}
	/// Refresh the flow field of the sector holding `target` so every cell of
	/// that sector steers towards it. Returns the sector that was updated
	pub fn compute_flow_field(&mut self, target: IVec2) -> Result<SectorID, NavigationError> {
		let (sector_id, local) = self.get_sector_and_local(target);
		let sector = self
			.sectors
			.get_mut(&sector_id)
			.ok_or(NavigationError::OutsideGeneratedWorld(target))?;
		sector.compute_flow_field(local);
		Ok(sector_id)
	}
	/// Steering direction stored for the cell at a grid coordinate by the last
	/// [NavigationWorld::compute_flow_field] of its sector
	pub fn direction(&self, grid_coord: IVec2) -> Option<Vec2> {
		let address = self.resolve(grid_coord);
		self.sectors
			.get(&address.sector_id)?
			.direction(address.cell_index)
	}
}
