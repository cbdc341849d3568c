#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Rigid Body Physics
//!
//! A small real-time rigid body pipeline for boxes and spheres.
//!
//! Each call to [`Physics::step`] runs one fixed timestep:
//!
//! 1.  **Predict:** gravity and accumulated forces are integrated into the
//!     velocities of every movable body and a lookahead transform is written.
//! 2.  **Broadphase:** the overlap table of candidate pairs is refreshed from
//!     bounding boxes. New pairs need real overlap; tracked pairs survive
//!     while their predicted bounds overlap within the collision margin.
//! 3.  **Narrowphase:** exact tests run on tracked pairs through a fixed
//!     [`CollisionDispatcher`] and the results are merged into persistent
//!     [`Manifold`]s.
//! 4.  **Solve:** sequential impulses with friction, restitution and warm
//!     starting resolve every touching pair.
//! 5.  **Integrate:** solved velocities move the world transforms, then
//!     forces are cleared.
//!
//! Bodies belong to the caller. The simulation only keeps the overlap table
//! between steps, keyed by the caller supplied [`BodyId`]s.
//!
//! ## Usage
//!
//! ```rust
//! use glam::Vec3;
//! use rigid::{Body, Physics, Shape};
//!
//! let mut bodies = vec![
//!     Body::new(1, Shape::cuboid(5.0, 0.5, 5.0), 0.0)?,
//!     Body::new(2, Shape::sphere(0.5), 1.0)?.with_position(Vec3::new(0.0, 3.0, 0.0)),
//! ];
//! let mut physics = Physics::new();
//! for _ in 0..120 {
//!     physics.step(&mut bodies, 1.0 / 60.0);
//! }
//! assert!(bodies[1].position().y > 0.9);
//! # Ok::<(), rigid::PhysicsError>(())
//! ```

pub mod body;
pub mod collision;
pub mod config;
pub mod error;
pub mod integrator;
pub mod shapes;
pub mod simulation;
pub mod solver;
pub mod transform;
pub mod types;

pub use body::Body;
pub use collision::{
    cast, cast_all, CollisionDispatcher, Contact, ContactBuffer, ContactPair, Manifold, Order,
    PairId, Ray, RayHit,
};
pub use config::PhysicsConfig;
pub use error::PhysicsError;
pub use shapes::{Shape, ShapeKind};
pub use simulation::{snapshot_poses, Physics};
pub use transform::Transform;
pub use types::{Aabb, BodyId, BodyPose, Material};
