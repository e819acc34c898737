//! Logic relating to moving groups of units. A move request picks the
//! corridor of sectors the group will cross, relaxes a shared integration
//! field over it and registers a motion. Agents then read their steering
//! direction from that motion every frame until they arrive
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Marks an entity steered by the navigation systems. The game's movement
/// code keeps `grid_coord` up to date as the entity moves
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[require(SteeringDirection)]
pub struct NavigationAgent {
	/// Grid coordinate the agent currently stands on
	grid_coord: IVec2,
}

impl NavigationAgent {
	/// Create a new instance of [NavigationAgent]
	pub fn new(grid_coord: IVec2) -> Self {
		NavigationAgent { grid_coord }
	}
	pub fn get_grid_coord(&self) -> IVec2 {
		self.grid_coord
	}
	pub fn set_grid_coord(&mut self, grid_coord: IVec2) {
		self.grid_coord = grid_coord;
	}
}

/// Unit vector on the ground plane an agent should move along, zero when the
/// agent has nowhere to go
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SteeringDirection(pub Vec2);

/// Ask for a group of units to move to a destination
#[derive(Event, Debug, Clone)]
pub struct EventMoveRequest {
	/// Units along with the grid coordinate each stands on, the first unit
	/// leads and decides the corridor
	units: Vec<(Entity, IVec2)>,
	/// Grid coordinate to move to
	destination: IVec2,
	/// Vehicles stick to roads where they can
	favour_roads: bool,
}

impl EventMoveRequest {
	/// Create a new instance of [EventMoveRequest]
	pub fn new(units: Vec<(Entity, IVec2)>, destination: IVec2, favour_roads: bool) -> Self {
		EventMoveRequest {
			units,
			destination,
			favour_roads,
		}
	}
	pub fn get_units(&self) -> &[(Entity, IVec2)] {
		&self.units
	}
	pub fn get_destination(&self) -> IVec2 {
		self.destination
	}
	pub fn is_favouring_roads(&self) -> bool {
		self.favour_roads
	}
}

/// Published once a [EventMoveRequest] has been served
#[derive(Event, Debug, Clone)]
pub struct EventMotionCreated {
	/// The registered motion
	motion: MotionId,
	/// Units following it
	units: Vec<Entity>,
	/// Where they are heading
	destination: IVec2,
}

impl EventMotionCreated {
	pub fn get_motion(&self) -> MotionId {
		self.motion
	}
	pub fn get_units(&self) -> &[Entity] {
		&self.units
	}
	pub fn get_destination(&self) -> IVec2 {
		self.destination
	}
}

/// Published when an agent reaches a cell without a steering direction
#[derive(Event, Debug, Clone, Copy)]
pub struct EventAgentArrived {
	/// The agent
	pub entity: Entity,
	/// The motion it was following
	pub motion: MotionId,
}

/// A destination can be moved to if it is walkable or is part of a building
/// or deposit the units are meant to reach
fn is_valid_destination(cell: &Cell) -> bool {
	cell.get_resource().is_some() || cell.get_structure().is_some() || cell.is_walkable()
}

/// Serve [EventMoveRequest]s by computing a corridor flow field and
/// registering the motion
#[cfg(not(tarpaulin_include))]
pub fn process_move_requests(
	mut events: EventReader<EventMoveRequest>,
	world: Res<NavigationWorld>,
	mut motions: ResMut<FlowFieldMotions>,
	mut event_motion: EventWriter<EventMotionCreated>,
) {
	for event in events.read() {
		let destination = event.get_destination();
		let Some(destination_cell) = world.get_cell(destination).copied() else {
			error!("Move request to {} is outside of the generated world", destination);
			continue;
		};
		if !is_valid_destination(&destination_cell) {
			debug!("Move request to {} ignored, the cell is blocked", destination);
			continue;
		}
		let units: Vec<(Entity, IVec2)> = event
			.get_units()
			.iter()
			.filter(|(_, coord)| *coord != destination)
			.copied()
			.collect();
		let Some((_, lead)) = units.first() else {
			continue;
		};
		let Some(sectors) = select_corridor(&world, *lead, destination) else {
			warn!("No sectors found for a move from {} to {}", lead, destination);
			continue;
		};
		let cost = if event.is_favouring_roads() {
			CorridorCost::Driving {
				destination: destination_cell,
				penalty: world.get_config().get_vehicle_off_road_penalty(),
			}
		} else {
			CorridorCost::Walking(destination_cell)
		};
		let Some(corridor) =
			FlowFieldCorridor::compute(&world, destination, &sectors, |cell| cost.cost(cell))
		else {
			continue;
		};
		let entities: Vec<Entity> = units.iter().map(|(e, _)| *e).collect();
		let motion = motions.register(corridor, cost, &entities);
		event_motion.write(EventMotionCreated {
			motion,
			units: entities,
			destination,
		});
	}
}

/// Detach despawned agents from their motions
#[cfg(not(tarpaulin_include))]
pub fn cleanup_removed_agents(
	mut removed: RemovedComponents<NavigationAgent>,
	mut motions: ResMut<FlowFieldMotions>,
) {
	for entity in removed.read() {
		motions.remove_unit(entity);
	}
}

/// Write the [SteeringDirection] of every agent following a motion. An agent
/// outside of its corridor grows the corridor first. An agent on a reached
/// cell with no lower neighbour has arrived, an agent the corridor cannot
/// reach is stopped. Either way it is detached from the motion
#[cfg(not(tarpaulin_include))]
pub fn steer_agents(
	mut agents: Query<(Entity, &NavigationAgent, &mut SteeringDirection)>,
	world: Res<NavigationWorld>,
	mut motions: ResMut<FlowFieldMotions>,
	mut event_arrived: EventWriter<EventAgentArrived>,
) {
	for (entity, agent, mut steering) in agents.iter_mut() {
		let Some(motion) = motions.get_unit_motion(&entity) else {
			if steering.0 != Vec2::ZERO {
				steering.0 = Vec2::ZERO;
			}
			continue;
		};
		match motions.steer(&world, &motion, agent.get_grid_coord()) {
			Some(Steering::Move(direction)) => steering.0 = direction,
			Some(Steering::Arrived) => {
				steering.0 = Vec2::ZERO;
				motions.remove_unit(entity);
				event_arrived.write(EventAgentArrived { entity, motion });
			}
			Some(Steering::Unreachable) | None => {
				warn!(
					"Agent {} at {} cannot reach its destination, stopping",
					entity,
					agent.get_grid_coord()
				);
				steering.0 = Vec2::ZERO;
				motions.remove_unit(entity);
			}
		}
	}
}
