//! Anchor alignment
//!
//! Snaps one part instance onto another so the matching anchors coincide.
//! `After` puts the source's `Start` on the target's `End`; `Before` puts the
//! source's `End` on the target's `Start`. In both cases the source root is
//! first turned so its forward axis (+Z) matches the target root's forward
//! axis, using the shortest arc. Roll about forward is left alone, and parts
//! whose forward axis does not run from `Start` to `End` are placed as-is.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{SwordError, SwordResult};
use crate::part::{AnchorFrame, PartInstance};
use crate::scene::SceneService;
use crate::types::AnchorRole;

/// Where the source part goes relative to the target part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// Source follows the target: source.Start -> target.End
    After,
    /// Source precedes the target: source.End -> target.Start
    Before,
}

impl Relation {
    /// (source anchor role, target anchor role)
    pub fn anchor_roles(&self) -> (AnchorRole, AnchorRole) {
        match self {
            Relation::After => (AnchorRole::Start, AnchorRole::End),
            Relation::Before => (AnchorRole::End, AnchorRole::Start),
        }
    }
}

/// Move and turn `source` so it connects to the already placed `target`
pub fn snap<S: SceneService + ?Sized>(
    scene: &mut S,
    source: &PartInstance,
    target: &PartInstance,
    relation: Relation,
) -> SwordResult<()> {
    let (source_role, target_role) = relation.anchor_roles();
    let source_anchor = checked_anchor(&*scene, source, source_role)?;
    let target_anchor = checked_anchor(&*scene, target, target_role)?;

    // Match forward axes
    let target_forward = scene.forward(target.root)?;
    let source_world = scene.world_pose(source.root)?;
    let turn = forward_turn(source_world.forward(), target_forward);
    scene.set_world_orientation(source.root, (turn * source_world.orientation).normalize())?;

    // Move the root by the anchor's offset so the anchors coincide
    let anchor_position = source_anchor.world_position(&*scene)?;
    let target_position = target_anchor.world_position(&*scene)?;
    let root_position = scene.world_position(source.root)?;
    scene.set_world_position(source.root, target_position + (root_position - anchor_position))?;

    tracing::trace!(
        "Snapped {} {:?} {} at {}",
        source.kind,
        relation,
        target.kind,
        target_position
    );
    Ok(())
}

pub fn snap_after<S: SceneService + ?Sized>(
    scene: &mut S,
    source: &PartInstance,
    target: &PartInstance,
) -> SwordResult<()> {
    snap(scene, source, target, Relation::After)
}

pub fn snap_before<S: SceneService + ?Sized>(
    scene: &mut S,
    source: &PartInstance,
    target: &PartInstance,
) -> SwordResult<()> {
    snap(scene, source, target, Relation::Before)
}

/// World distance between the anchors `relation` would join
pub fn seam_gap<S: SceneService + ?Sized>(
    scene: &S,
    source: &PartInstance,
    target: &PartInstance,
    relation: Relation,
) -> SwordResult<f32> {
    let (source_role, target_role) = relation.anchor_roles();
    let a = checked_anchor(scene, source, source_role)?.world_position(scene)?;
    let b = checked_anchor(scene, target, target_role)?.world_position(scene)?;
    Ok(a.distance(b))
}

/// Rotation taking `from` onto `to` along the shortest arc
fn forward_turn(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

/// The instance's anchor, provided it still hangs directly off the instance root
fn checked_anchor<S: SceneService + ?Sized>(
    scene: &S,
    instance: &PartInstance,
    role: AnchorRole,
) -> SwordResult<AnchorFrame> {
    let anchor = instance.anchor(role);
    if scene.parent(anchor.node) != Some(instance.root) {
        return Err(SwordError::UnresolvedAnchor {
            part: instance.root,
            role,
        });
    }
    Ok(anchor)
}
