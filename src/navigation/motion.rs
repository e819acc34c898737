//! Book-keeping of the corridors units are currently following. Every move
//! order registers a motion under a fresh [MotionId], units are detached as
//! they arrive and a motion is dropped once nobody follows it anymore.
//!
//! A unit found outside of its corridor grows the corridor by the sector it
//! stands in, so followers starting away from the lead unit are still
//! steered to the destination
//!

use std::collections::HashMap;

use bevy::prelude::*;

use crate::prelude::*;

/// Unique ID of a motion, never `0`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Reflect)]
pub struct MotionId(u32);

impl MotionId {
	pub fn get(&self) -> u32 {
		self.0
	}
}

/// What a unit following a motion should do from the cell it stands on
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Steering {
	/// Move along the unit vector
	Move(Vec2),
	/// The unit stands on a reached cell with no lower neighbour
	Arrived,
	/// The wave cannot reach the cell, it is blocked, cut off or outside of
	/// the generated world
	Unreachable,
}

/// A corridor along with the units following it
#[derive(Clone, Debug)]
pub struct Motion {
	/// Shared integration values
	corridor: FlowFieldCorridor,
	/// Costs the corridor was relaxed with
	cost: CorridorCost,
	/// Units steering along the corridor
	units: Vec<Entity>,
}

impl Motion {
	pub fn get_corridor(&self) -> &FlowFieldCorridor {
		&self.corridor
	}
	pub fn get_cost(&self) -> CorridorCost {
		self.cost
	}
	pub fn get_units(&self) -> &[Entity] {
		&self.units
	}
	/// Grid coordinate the units are heading to
	pub fn get_destination(&self) -> IVec2 {
		self.corridor.get_target()
	}
}

/// Registry of active motions
#[derive(Resource, Debug)]
pub struct FlowFieldMotions {
	/// Next ID handed out
	next_id: u32,
	/// Active motions
	motions: HashMap<MotionId, Motion>,
	/// Which motion each unit follows
	unit_motions: HashMap<Entity, MotionId>,
}

impl Default for FlowFieldMotions {
	fn default() -> Self {
		FlowFieldMotions {
			next_id: 1,
			motions: HashMap::new(),
			unit_motions: HashMap::new(),
		}
	}
}

impl FlowFieldMotions {
	/// Register a corridor relaxed with `cost` and followed by `units`. A
	/// unit already following another motion is moved over to the new one
	pub fn register(
		&mut self,
		corridor: FlowFieldCorridor,
		cost: CorridorCost,
		units: &[Entity],
	) -> MotionId {
		let id = MotionId(self.next_id);
		self.next_id = self.next_id.wrapping_add(1).max(1);
		for unit in units {
			self.remove_unit(*unit);
			self.unit_motions.insert(*unit, id);
		}
		debug!(
			"Registered motion {} towards {} for {} units",
			id.get(),
			corridor.get_target(),
			units.len()
		);
		self.motions.insert(
			id,
			Motion {
				corridor,
				cost,
				units: units.to_vec(),
			},
		);
		id
	}
	/// Detach a unit from its motion, dropping the motion if it was the last
	/// unit following it. Returns the motion the unit was following
	pub fn remove_unit(&mut self, unit: Entity) -> Option<MotionId> {
		let id = self.unit_motions.remove(&unit)?;
		if let Some(motion) = self.motions.get_mut(&id) {
			motion.units.retain(|u| *u != unit);
			if motion.units.is_empty() {
				self.motions.remove(&id);
				debug!("Motion {} finished", id.get());
			}
		}
		Some(id)
	}
	pub fn get_motion(&self, id: &MotionId) -> Option<&Motion> {
		self.motions.get(id)
	}
	/// The motion a unit is following
	pub fn get_unit_motion(&self, unit: &Entity) -> Option<MotionId> {
		self.unit_motions.get(unit).copied()
	}
	/// Number of active motions
	pub fn len(&self) -> usize {
		self.motions.len()
	}
	pub fn is_empty(&self) -> bool {
		self.motions.is_empty()
	}
	/// Steering direction of a unit of motion `id` standing at `grid_coord`,
	/// the corridor is only read
	pub fn direction_for(&self, id: &MotionId, grid_coord: IVec2) -> Option<Vec2> {
		self.motions.get(id)?.corridor.direction(grid_coord)
	}
	/// Decide how a unit of motion `id` standing at `grid_coord` should move.
	/// A coordinate outside of the corridor grows it by the sector holding
	/// the coordinate first. [None] if the motion does not exist
	pub fn steer(
		&mut self,
		world: &NavigationWorld,
		id: &MotionId,
		grid_coord: IVec2,
	) -> Option<Steering> {
		let motion = self.motions.get_mut(id)?;
		if !motion.corridor.contains(grid_coord) {
			let cost = motion.cost;
			motion
				.corridor
				.extend(world, grid_coord, move |cell| cost.cost(cell));
		}
		let corridor = &motion.corridor;
		Some(match corridor.direction(grid_coord) {
			Some(direction) => Steering::Move(direction),
			None if corridor.is_reached(grid_coord) => Steering::Arrived,
			None => Steering::Unreachable,
		})
	}
}
