//! Defines the Bevy [Plugin] for sector navigation
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod motion_layer;
pub mod sector_layer;

/// Ordering of the navigation systems within [Update]
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum NavigationSet {
	/// Bring the world and motions up to date
	Tidy,
	/// Serve move requests and steer agents
	Calculate,
}

/// Inserts the [NavigationWorld] and [FlowFieldMotions] resources and the
/// systems keeping them up to date. A [NavigationConfig] inserted before the
/// plugin is added is used to size the world, otherwise the default is used
pub struct SectorNavigationPlugin;

impl Plugin for SectorNavigationPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		let config = app
			.world()
			.get_resource::<NavigationConfig>()
			.copied()
			.unwrap_or_default();
		let config = match config.validate() {
			Ok(()) => config,
			Err(e) => {
				error!("Falling back to the default navigation config: {}", e);
				NavigationConfig::default()
			}
		};
		app.register_type::<Ordinal>()
			.register_type::<SectorID>()
			.register_type::<FieldCell>()
			.register_type::<NavigationConfig>()
			.register_type::<NavigationAgent>()
			.register_type::<SteeringDirection>()
			.insert_resource(config)
			.insert_resource(NavigationWorld::new(config))
			.init_resource::<FlowFieldMotions>()
			.add_event::<sector_layer::EventSectorCreated>()
			.add_event::<sector_layer::EventSectorRemoved>()
			.add_event::<sector_layer::EventUpdateCell>()
			.add_event::<motion_layer::EventMoveRequest>()
			.add_event::<motion_layer::EventMotionCreated>()
			.add_event::<motion_layer::EventAgentArrived>()
			.configure_sets(Update, (NavigationSet::Tidy, NavigationSet::Calculate).chain())
			.add_systems(
				Update,
				(
					(
						sector_layer::process_sector_lifecycle,
						sector_layer::process_cell_updates,
						motion_layer::cleanup_removed_agents,
					)
						.chain()
						.in_set(NavigationSet::Tidy),
					(
						motion_layer::process_move_requests,
						motion_layer::steer_agents,
					)
						.chain()
						.in_set(NavigationSet::Calculate),
				),
			);
	}
}
