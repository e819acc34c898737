//! Recoverable failures of the navigation core. None of these are fatal, a
//! caller is expected to branch on them like any other return value
//!

use bevy::prelude::*;
use thiserror::Error;

use crate::prelude::SectorID;

/// Why a graph search did not produce a path
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
	/// The open set was exhausted before the goal was reached
	#[error("no path found")]
	NoPathFound,
	/// The search gave up after expanding `iterations` nodes
	#[error("search budget exceeded after {iterations} iterations")]
	SearchBudgetExceeded {
		/// Number of expansions performed before giving up
		iterations: usize,
	},
}

/// Failures of world and configuration operations
#[derive(Debug, Error)]
pub enum NavigationError {
	/// The grid coordinate does not belong to any registered sector
	#[error("grid coordinate {0} is outside of the generated world")]
	OutsideGeneratedWorld(IVec2),
	/// The sector has not been registered
	#[error("sector {0:?} does not exist")]
	SectorNotFound(SectorID),
	/// A configuration value cannot be used
	#[error("invalid navigation config: {0}")]
	InvalidConfig(String),
	/// Reading a configuration file failed
	#[cfg(feature = "ron")]
	#[error("failed reading navigation config")]
	Io(#[from] std::io::Error),
	/// A configuration file is not valid RON
	#[cfg(feature = "ron")]
	#[error("failed deserializing navigation config")]
	Ron(#[from] ron::error::SpannedError),
}
