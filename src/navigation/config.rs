//! Tunables of the navigation grid
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Describes the resolution of the world grid and the budgets of the
/// searches run over it
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Resource, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct NavigationConfig {
	/// Number of cells along one edge of a sector, every sector holds
	/// `map_res * map_res` cells
	map_res: usize,
	/// World-space length of the edge of a cell
	cell_size: f32,
	/// Maximum number of node expansions of a per-cell search
	cell_search_max_iterations: usize,
	/// Maximum number of node expansions of a per-sector search
	sector_search_max_iterations: usize,
	/// Cost added to every non-road cell when a vehicle is moving
	vehicle_off_road_penalty: u32,
}

impl Default for NavigationConfig {
	fn default() -> Self {
		NavigationConfig {
			map_res: DEFAULT_MAP_RES,
			cell_size: DEFAULT_CELL_SIZE,
			cell_search_max_iterations: 2048,
			sector_search_max_iterations: 500,
			vehicle_off_road_penalty: 10,
		}
	}
}

impl NavigationConfig {
	/// Create a new instance of [NavigationConfig] with default search budgets.
	/// Panics if `map_res` is zero or `cell_size` is not a positive number
	pub fn new(map_res: usize, cell_size: f32) -> Self {
		let config = NavigationConfig {
			map_res,
			cell_size,
			..Default::default()
		};
		if let Err(e) = config.validate() {
			panic!("{}", e);
		}
		config
	}
	/// Override the search budgets
	pub fn with_iteration_limits(mut self, cell: usize, sector: usize) -> Self {
		self.cell_search_max_iterations = cell;
		self.sector_search_max_iterations = sector;
		self
	}
	/// Override the penalty applied to vehicles leaving the road network
	pub fn with_vehicle_off_road_penalty(mut self, penalty: u32) -> Self {
		self.vehicle_off_road_penalty = penalty;
		self
	}
	/// Ensure the values describe a usable grid
	pub fn validate(&self) -> Result<(), NavigationError> {
		if self.map_res == 0 {
			return Err(NavigationError::InvalidConfig(
				"map_res must be greater than zero".to_string(),
			));
		}
		if self.map_res > i32::MAX as usize {
			return Err(NavigationError::InvalidConfig(format!(
				"map_res {} does not fit into a grid coordinate",
				self.map_res
			)));
		}
		if self.cell_size <= 0.0 || !self.cell_size.is_finite() {
			return Err(NavigationError::InvalidConfig(format!(
				"cell_size must be a positive number, got {}",
				self.cell_size
			)));
		}
		Ok(())
	}
	pub fn get_map_res(&self) -> usize {
		self.map_res
	}
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Number of cells held by a single sector
	pub fn get_cell_count(&self) -> usize {
		self.map_res * self.map_res
	}
	pub fn get_cell_search_max_iterations(&self) -> usize {
		self.cell_search_max_iterations
	}
	pub fn get_sector_search_max_iterations(&self) -> usize {
		self.sector_search_max_iterations
	}
	pub fn get_vehicle_off_road_penalty(&self) -> u32 {
		self.vehicle_off_road_penalty
	}
	/// Parse a [NavigationConfig] from a RON string, missing values fall back
	/// to their defaults
	#[cfg(feature = "ron")]
	pub fn from_ron_str(s: &str) -> Result<Self, NavigationError> {
		let config: NavigationConfig = ron::de::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
	/// From a `ron` file generate the [NavigationConfig]
	#[cfg(feature = "ron")]
	pub fn from_ron_file(path: impl AsRef<std::path::Path>) -> Result<Self, NavigationError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_ron_str(&contents)
	}
}
