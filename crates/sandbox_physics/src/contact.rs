//! Contact reporting between the physics world and its listeners.

use std::time::Duration;

use bevy::prelude::*;

use crate::world::BodyHandle;

/// One body's view of a contact that started during a step.
///
/// Every started contact produces two records, one per participating body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    /// The body this record is addressed to.
    pub body: BodyHandle,
    /// The body it touched.
    pub other: BodyHandle,
    /// World-space contact normal pointing from `other` toward `body`.
    /// A floor beneath `body` yields a normal close to +Y.
    /// `None` when the pair reported no contact points.
    pub normal: Option<Vec3>,
    /// World clock at the end of the step that produced the contact.
    pub at: Duration,
}

/// Receives contacts synchronously while [`PhysicsWorld::update_with`] runs.
///
/// [`PhysicsWorld::update_with`]: crate::PhysicsWorld::update_with
pub trait ContactListener {
    fn on_contact(&mut self, contact: &ContactRecord);
}

impl<F: FnMut(&ContactRecord)> ContactListener for F {
    fn on_contact(&mut self, contact: &ContactRecord) {
        self(contact)
    }
}

/// ECS mirror of a [`ContactRecord`], written by the fixed-step system.
#[derive(Message, Debug, Clone, Copy)]
pub struct ContactMessage(pub ContactRecord);
