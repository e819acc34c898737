//! Navigation over an unbounded grid of square sectors.
//!
//! [Path-finding in a sector based world](https://www.gameaipro.com/GameAIPro/GameAIPro_Chapter23_Crowd_Pathfinding_and_Steering_Using_Flow_Field_Tiles.pdf)
//!
//! [leifnode](https://leifnode.com/2013/12/flow-field-pathfinding/)
//!
//! The world is a grid of cells addressed by absolute integer coordinates.
//! Cells are grouped into sectors of `map_res x map_res` which are generated
//! on demand, so the generated world can grow in any direction and may have
//! holes.
//!
//! ```text
//!             x < 0       |       x >= 0
//!   _________________________________________
//!  |__|__|__|__|__|__|__|__||__|__|__|__|__|__|
//!  |__|__|__|__|__|__|__|__||__|__|__|__|__|__|
//!  |__|__| sector (-1, 0)|__||__| sector (0, 0)|
//!  |__|__|__|__|__|__|__|__||__|__|__|__|__|__|
//! ```
//!
//! Definitions:
//!
//! * Cell - the unit of occupancy, buildings, resource deposits and
//! conveyors block a cell while rails and roads leave it walkable
//! * Sector - a block of cells owning a cost field, an integration field and
//! a flow field
//! * Cost field - per-cell cost of crossing a cell, `1` by default and
//! `0xffff` for a blocked cell
//! * Integration field - cumulative cost from every cell to a target cell,
//! relaxed outwards from the target
//! * Flow field - per-cell direction bits pointing at the neighbour with the
//! lowest integration value
//! * Corridor - an integration field spanning the list of sectors a group of
//! units will cross
//!
//! Two granularities of A* are available, per cell for exact routes and per
//! sector for coarse routing when no cell route exists.
//!

pub mod cell;
pub mod config;
pub mod corridor;
pub mod error;
pub mod fields;
pub mod motion;
pub mod search;
pub mod sector;
pub mod utilities;
pub mod world;
