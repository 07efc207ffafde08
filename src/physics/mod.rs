//! Physics simulation module.
//!
//! Contains the rotation-group helpers, the rotor/actuator model and the
//! rigid body dynamics with their integrators.

pub mod dynamics;
pub mod motor;
pub mod so3;

pub use dynamics::*;
pub use motor::*;
pub use so3::*;
