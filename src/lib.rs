//! Genetic-algorithm driven 2D irregular-shape nesting.
//!
//! Given a board size, a mandatory edge margin and inter-piece clearance,
//! and a multiset of polygons with enumerated allowed rotation angles, this
//! crate searches for a placement that packs every piece onto as few boards
//! as possible while maximizing average area utilization. It is an offline
//! batch optimizer: one problem description in, one placement out.

pub mod collision;
pub mod concavity;
pub mod evaluator;
pub mod ga;
pub mod geometry;
pub mod io;
pub mod model;
pub mod placer;
pub mod rng;
