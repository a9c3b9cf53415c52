//! Per-entity data.
//!
//! This module groups the value types that make up an entity record and the
//! descriptors used to create one. None of them know about the ordered views;
//! linking and relinking is the pool's job.
//!
//! Submodules overview:
//! - [`class`] – spawn-time description of an entity
//! - [`collider`] – collision shape plus the injectable geometry predicate
//! - [`entity`] – the per-slot entity record and opaque host references
//! - [`handle`] – generational handles and uids
//! - [`kinematics`] – position, velocity, acceleration and committed motion
//! - [`property`] – script-visible property keys and values
//! - [`status`] – lifecycle status and removal kinds
//! - [`worldmask`] – world partition bit mask

pub mod class;
pub mod collider;
pub mod entity;
pub mod handle;
pub mod kinematics;
pub mod property;
pub mod status;
pub mod worldmask;
