//! `use bevy_sector_navigation::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navigation::{
	cell::*,
	config::*,
	corridor::*,
	error::*,
	fields::{cost_field::*, flow_field::*, integration_field::*, *},
	motion::*,
	search::{cell_search::*, sector_search::*, *},
	sector::*,
	utilities::*,
	world::*,
};

#[doc(hidden)]
pub use crate::plugin::{motion_layer::*, sector_layer::*, *};
