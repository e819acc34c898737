//! Coarse routing over the grid of sectors. Every registered sector is
//! walkable and all eight neighbours are considered, the result is the
//! sequence of sectors to cross
//!

use bevy::prelude::*;

use super::*;
use crate::prelude::*;

/// View of the world where each node is a whole sector
pub struct SectorGraph<'w> {
	/// Registry of sectors
	world: &'w NavigationWorld,
}

impl<'w> SectorGraph<'w> {
	/// Create a new instance of [SectorGraph]
	pub fn new(world: &'w NavigationWorld) -> Self {
		SectorGraph { world }
	}
}

impl SearchGrid for SectorGraph<'_> {
	type Payload = Sector;
	fn lookup(&self, coord: IVec2) -> Option<&Sector> {
		self.world.get_sector(&SectorID::from(coord))
	}
	fn is_walkable(&self, _payload: &Sector) -> bool {
		true
	}
}

/// Find the sequence of sectors leading from `start` to `end`
pub fn try_find_sector_path(
	world: &NavigationWorld,
	start: SectorID,
	end: SectorID,
) -> Result<Vec<SectorID>, SearchError> {
	let options = SearchOptions::new(world.get_config().get_sector_search_max_iterations())
		.with_diagonal_policy(DiagonalPolicy::Unrestricted);
	let path = try_find_path(
		start.as_ivec2(),
		end.as_ivec2(),
		&SectorGraph::new(world),
		&options,
	)?;
	Ok(path.into_iter().map(SectorID::from).collect())
}

/// Find the sequence of sectors leading from `start` to `end`, [None] when
/// the sectors are not connected
pub fn find_sector_path(world: &NavigationWorld, start: SectorID, end: SectorID) -> Option<Vec<SectorID>> {
	try_find_sector_path(world, start, end).ok()
}
