//! A generic A* search shared by the per-cell and per-sector pathfinders.
//!
//! The graph is an unbounded 8-connected grid addressed by [IVec2]. What a
//! coordinate holds, and whether it can be walked over, is supplied by a
//! [SearchGrid]. Per-call overrides of the step cost, walkability and
//! diagonal movement are carried by [SearchOptions].
//!
//! Each iteration scans the open set for the node of lowest `f = g + h`,
//! preferring the smaller `h` on ties, and expands its orthogonal neighbours
//! followed by its diagonal neighbours. A diagonal step is gated on the
//! orthogonal cells flanking it so a path never slips through the corner
//! shared by two blocked cells:
//!
//! ```text
//!  ___________
//! |     |     |
//! |  o  |  X  |   o -> . is rejected, both flanks are blocked
//! |_____|_____|
//! |     |     |
//! |  X  |  .  |
//! |_____|_____|
//! ```
//!
//! The goal is always explorable as the final node of a path even when its
//! payload is not walkable, so a path can end on a building.
//!

pub mod cell_search;
pub mod sector_search;

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::prelude::*;

/// Supplies the payload of each coordinate and its default walkability
pub trait SearchGrid {
	/// What a coordinate holds
	type Payload;
	/// The payload at a coordinate, [None] if nothing exists there. A
	/// coordinate without a payload is never traversable
	fn lookup(&self, coord: IVec2) -> Option<&Self::Payload>;
	/// Whether a payload can be walked over
	fn is_walkable(&self, payload: &Self::Payload) -> bool;
}

/// Which diagonal steps a search may take
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum DiagonalPolicy {
	/// Allowed when at least one flanking orthogonal cell is traversable
	#[default]
	AnyFlankOpen,
	/// Allowed only when both flanking orthogonal cells are traversable
	BothFlanksOpen,
	/// Always allowed
	Unrestricted,
	/// Never allowed
	Disabled,
}

impl DiagonalPolicy {
	/// Decide whether a diagonal step is allowed from the traversability of
	/// its flanks
	fn allows(&self, first_flank_open: bool, second_flank_open: bool) -> bool {
		match self {
			DiagonalPolicy::AnyFlankOpen => first_flank_open || second_flank_open,
			DiagonalPolicy::BothFlanksOpen => first_flank_open && second_flank_open,
			DiagonalPolicy::Unrestricted => true,
			DiagonalPolicy::Disabled => false,
		}
	}
}

/// Step cost override, `(from, to) -> cost`
pub type StepCostFn<'a> = &'a dyn Fn(IVec2, IVec2) -> f32;
/// Predicate over a payload
pub type PayloadFn<'a, P> = &'a dyn Fn(&P) -> bool;

/// Per-call tuning of a search
pub struct SearchOptions<'a, P> {
	/// Cost of a single step, `1` when not set
	step_cost: Option<StepCostFn<'a>>,
	/// Replaces [SearchGrid::is_walkable] when set
	is_walkable: Option<PayloadFn<'a, P>>,
	/// Decides per expanded node whether diagonals are considered at all
	diagonals: Option<PayloadFn<'a, P>>,
	/// Gate applied to each diagonal step
	diagonal_policy: DiagonalPolicy,
	/// Maximum number of node expansions
	max_iterations: usize,
}

impl<'a, P> SearchOptions<'a, P> {
	/// Create options with unit step costs, the grid's walkability and
	/// diagonals gated by [DiagonalPolicy::AnyFlankOpen]
	pub fn new(max_iterations: usize) -> Self {
		SearchOptions {
			step_cost: None,
			is_walkable: None,
			diagonals: None,
			diagonal_policy: DiagonalPolicy::default(),
			max_iterations,
		}
	}
	pub fn with_step_cost(mut self, step_cost: StepCostFn<'a>) -> Self {
		self.step_cost = Some(step_cost);
		self
	}
	pub fn with_walkable(mut self, is_walkable: PayloadFn<'a, P>) -> Self {
		self.is_walkable = Some(is_walkable);
		self
	}
	pub fn with_diagonals(mut self, diagonals: PayloadFn<'a, P>) -> Self {
		self.diagonals = Some(diagonals);
		self
	}
	pub fn with_diagonal_policy(mut self, policy: DiagonalPolicy) -> Self {
		self.diagonal_policy = policy;
		self
	}
	pub fn get_max_iterations(&self) -> usize {
		self.max_iterations
	}
	pub fn get_diagonal_policy(&self) -> DiagonalPolicy {
		self.diagonal_policy
	}
}

/// Outcome of checking a neighbour during an expansion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighbourStatus {
	/// Nothing exists there or it cannot be walked over
	NotWalkable,
	/// Already in the closed set
	AlreadyEvaluated,
	/// Added to the open set or its cost was relaxed
	JustEvaluated,
}

impl NeighbourStatus {
	/// Whether the neighbour counts as open ground for the diagonal gate
	fn is_traversable(&self) -> bool {
		*self != NeighbourStatus::NotWalkable
	}
}

/// A node of the search tree, parents are indices into the node arena
#[derive(Clone, Copy, Debug)]
struct SearchNode {
	/// Grid position
	coord: IVec2,
	/// Cost from the start
	g: f32,
	/// Straight-line distance to the goal
	h: f32,
	/// Arena index of the node this one was reached from
	parent: Option<usize>,
}

impl SearchNode {
	/// Estimated total cost through this node
	fn f(&self) -> f32 {
		self.g + self.h
	}
}

/// State of one search
struct Search<'g, 'o, 'a, G: SearchGrid> {
	/// Graph being searched
	grid: &'g G,
	/// Per-call overrides
	options: &'o SearchOptions<'a, G::Payload>,
	/// Goal coordinate
	end: IVec2,
	/// Every node ever discovered
	arena: Vec<SearchNode>,
	/// Arena indices of open nodes in discovery order
	open: Vec<usize>,
	/// Open coordinate to arena index
	open_lookup: HashMap<IVec2, usize>,
	/// Coordinates already expanded
	closed: HashSet<IVec2>,
}

impl<'g, 'o, 'a, G: SearchGrid> Search<'g, 'o, 'a, G> {
	/// Seed a search with its start node
	fn new(start: IVec2, end: IVec2, grid: &'g G, options: &'o SearchOptions<'a, G::Payload>) -> Self {
		let mut open_lookup = HashMap::new();
		open_lookup.insert(start, 0);
		Search {
			grid,
			options,
			end,
			arena: vec![SearchNode {
				coord: start,
				g: 0.0,
				h: 0.0,
				parent: None,
			}],
			open: vec![0],
			open_lookup,
			closed: HashSet::new(),
		}
	}
	/// Position within `open` of the node with the lowest `f`, ties go to
	/// the lower `h`. Earlier discoveries win exact ties
	fn select_lowest(&self) -> Option<usize> {
		let mut best: Option<usize> = None;
		for (position, index) in self.open.iter().enumerate() {
			let node = &self.arena[*index];
			match best {
				None => best = Some(position),
				Some(b) => {
					let best_node = &self.arena[self.open[b]];
					if node.f() < best_node.f()
						|| (node.f() == best_node.f() && node.h < best_node.h)
					{
						best = Some(position);
					}
				}
			}
		}
		best
	}
	/// Whether a payload may be stepped onto as an intermediate node
	fn payload_walkable(&self, payload: &G::Payload) -> bool {
		match self.options.is_walkable {
			Some(is_walkable) => is_walkable(payload),
			None => self.grid.is_walkable(payload),
		}
	}
	/// Examine the neighbour of `from` in direction `ordinal`, adding it to
	/// the open set or relaxing its cost
	fn check_neighbour(&mut self, from: usize, ordinal: Ordinal) -> NeighbourStatus {
		let from_node = self.arena[from];
		let coord = from_node.coord + ordinal.to_offset();
		if self.closed.contains(&coord) {
			return NeighbourStatus::AlreadyEvaluated;
		}
		let Some(payload) = self.grid.lookup(coord) else {
			return NeighbourStatus::NotWalkable;
		};
		if !self.payload_walkable(payload) && coord != self.end {
			return NeighbourStatus::NotWalkable;
		}
		let step = match self.options.step_cost {
			Some(step_cost) => step_cost(from_node.coord, coord),
			None => 1.0,
		};
		let g = from_node.g + step;
		let h = coord.as_vec2().distance(self.end.as_vec2());
		match self.open_lookup.get(&coord) {
			None => {
				let index = self.arena.len();
				self.arena.push(SearchNode {
					coord,
					g,
					h,
					parent: Some(from),
				});
				self.open.push(index);
				self.open_lookup.insert(coord, index);
			}
			Some(&index) => {
				let node = &mut self.arena[index];
				if node.g > g {
					node.g = g;
					node.h = h;
					node.parent = Some(from);
				}
			}
		}
		NeighbourStatus::JustEvaluated
	}
	/// Expand a node, orthogonal neighbours first and then any diagonal the
	/// options allow
	fn expand(&mut self, current: usize) {
		let mut statuses = [(Ordinal::North, NeighbourStatus::NotWalkable); 4];
		for (slot, ordinal) in statuses.iter_mut().zip(Ordinal::ORTHOGONAL) {
			*slot = (ordinal, self.check_neighbour(current, ordinal));
		}
		let policy = self.options.diagonal_policy;
		if policy == DiagonalPolicy::Disabled {
			return;
		}
		let diagonals = match (self.options.diagonals, self.grid.lookup(self.arena[current].coord)) {
			(Some(diagonals), Some(payload)) => diagonals(payload),
			_ => true,
		};
		if !diagonals {
			return;
		}
		let is_open = |flank: Ordinal| {
			statuses
				.iter()
				.find(|(ordinal, _)| *ordinal == flank)
				.is_some_and(|(_, status)| status.is_traversable())
		};
		for ordinal in Ordinal::DIAGONAL {
			let allowed = match ordinal.flanks() {
				Some((a, b)) => policy.allows(is_open(a), is_open(b)),
				None => false,
			};
			if allowed {
				self.check_neighbour(current, ordinal);
			}
		}
	}
	/// Walk parent links from `index` back to the start
	fn reconstruct(&self, index: usize) -> Vec<IVec2> {
		let mut path = Vec::new();
		let mut current = Some(index);
		while let Some(i) = current {
			path.push(self.arena[i].coord);
			current = self.arena[i].parent;
		}
		path.reverse();
		path
	}
	/// Run the search to completion
	fn run(mut self) -> Result<Vec<IVec2>, SearchError> {
		let mut iterations = 0;
		loop {
			let Some(position) = self.select_lowest() else {
				return Err(SearchError::NoPathFound);
			};
			let current = self.open[position];
			let coord = self.arena[current].coord;
			if coord == self.end {
				return Ok(self.reconstruct(current));
			}
			self.open.remove(position);
			self.open_lookup.remove(&coord);
			self.closed.insert(coord);
			self.expand(current);
			iterations += 1;
			if iterations > self.options.max_iterations {
				warn!(
					"Search towards {} gave up after {} iterations",
					self.end, iterations
				);
				return Err(SearchError::SearchBudgetExceeded { iterations });
			}
		}
	}
}

/// Find the cheapest path from `start` to `end`. The path begins with
/// `start` and finishes with `end`
pub fn try_find_path<G: SearchGrid>(
	start: IVec2,
	end: IVec2,
	grid: &G,
	options: &SearchOptions<G::Payload>,
) -> Result<Vec<IVec2>, SearchError> {
	Search::new(start, end, grid, options).run()
}

/// Find the cheapest path from `start` to `end`, [None] when no path exists
/// or the search budget ran out
pub fn find_path<G: SearchGrid>(
	start: IVec2,
	end: IVec2,
	grid: &G,
	options: &SearchOptions<G::Payload>,
) -> Option<Vec<IVec2>> {
	try_find_path(start, end, grid, options).ok()
}
