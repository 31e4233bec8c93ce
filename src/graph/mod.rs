//! Read-only occupancy query layer.
//!
//! Plain resolver functions, exposed as JSON by [`crate::web::occupancy`].

pub mod occupants;

pub use occupants::{EventNode, OccupancyFilter, OccupantNode};
