//! Part templates, anchor frames and placed part instances

use glam::Vec3;

use crate::error::{SwordError, SwordResult};
use crate::scene::{NodeId, SceneError, SceneService};
use crate::types::{AnchorRole, PartKind, Pose};

/// A named connection point on a part, resolved to a direct child node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorFrame {
    pub role: AnchorRole,
    pub node: NodeId,
}

impl AnchorFrame {
    /// Resolve the anchor for `role` among the direct children of `root`
    pub fn resolve<S: SceneService + ?Sized>(
        scene: &S,
        root: NodeId,
        role: AnchorRole,
    ) -> Option<Self> {
        scene
            .find_child(root, role.node_name())
            .map(|node| Self { role, node })
    }

    pub fn world_position<S: SceneService + ?Sized>(&self, scene: &S) -> SwordResult<Vec3> {
        scene
            .world_position(self.node)
            .map_err(|_| self.unresolved(scene))
    }

    fn unresolved<S: SceneService + ?Sized>(&self, scene: &S) -> SwordError {
        SwordError::UnresolvedAnchor {
            part: scene.parent(self.node).unwrap_or(self.node),
            role: self.role,
        }
    }
}

/// Reusable part definition: a root node plus its `Start` and `End` anchors
///
/// Templates are never mutated after resolution. An invalid template keeps
/// whatever it could resolve so callers can report what is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTemplate {
    root: NodeId,
    start: Option<AnchorFrame>,
    end: Option<AnchorFrame>,
}

impl PartTemplate {
    /// Resolve a template by looking up the anchors under `root`
    pub fn resolve<S: SceneService + ?Sized>(scene: &S, root: NodeId) -> Self {
        let (start, end) = if scene.contains(root) {
            (
                AnchorFrame::resolve(scene, root, AnchorRole::Start),
                AnchorFrame::resolve(scene, root, AnchorRole::End),
            )
        } else {
            (None, None)
        };
        Self { root, start, end }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn start(&self) -> Option<AnchorFrame> {
        self.start
    }

    pub fn end(&self) -> Option<AnchorFrame> {
        self.end
    }

    /// Root and both anchors resolved
    pub fn is_valid(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// First anchor that failed to resolve, if any
    pub fn missing_anchor(&self) -> Option<AnchorRole> {
        if self.start.is_none() {
            Some(AnchorRole::Start)
        } else if self.end.is_none() {
            Some(AnchorRole::End)
        } else {
            None
        }
    }

    /// Check validity against the live scene
    ///
    /// The root must still exist and still carry both anchors as direct
    /// children, otherwise an `InvalidTemplate` error names the missing anchor.
    pub fn validate<S: SceneService + ?Sized>(&self, scene: &S) -> SwordResult<()> {
        if !scene.contains(self.root) {
            return Err(SceneError::NodeNotFound(self.root).into());
        }
        let missing = self.missing_anchor().or_else(|| {
            [AnchorRole::Start, AnchorRole::End]
                .into_iter()
                .find(|role| AnchorFrame::resolve(scene, self.root, *role).is_none())
        });
        match missing {
            None => Ok(()),
            Some(missing) => Err(SwordError::InvalidTemplate {
                root: self.root,
                name: scene.name(self.root).unwrap_or("<missing>").to_string(),
                missing,
            }),
        }
    }

    /// Copy the template's geometry under `parent` and resolve the copy's anchors
    ///
    /// The copy starts at identity local pose under `parent`.
    pub fn instantiate<S: SceneService + ?Sized>(
        &self,
        scene: &mut S,
        kind: PartKind,
        parent: NodeId,
    ) -> SwordResult<PartInstance> {
        self.validate(&*scene)?;

        let root = scene.instantiate(self.root, Some(parent))?;
        scene.set_local_pose(root, Pose::IDENTITY)?;

        let start = AnchorFrame::resolve(&*scene, root, AnchorRole::Start).ok_or(
            SwordError::UnresolvedAnchor {
                part: root,
                role: AnchorRole::Start,
            },
        )?;
        let end = AnchorFrame::resolve(&*scene, root, AnchorRole::End).ok_or(
            SwordError::UnresolvedAnchor {
                part: root,
                role: AnchorRole::End,
            },
        )?;

        Ok(PartInstance {
            kind,
            template: self.root,
            root,
            start,
            end,
        })
    }
}

/// Check that `root` has both `Start` and `End` as direct children
pub fn has_anchor_children<S: SceneService + ?Sized>(scene: &S, root: NodeId) -> bool {
    let children = scene.children(root);
    let has = |role: AnchorRole| {
        children
            .iter()
            .any(|child| scene.name(*child) == Some(role.node_name()))
    };
    has(AnchorRole::Start) && has(AnchorRole::End)
}

/// A placed copy of a template, owned by the sword that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInstance {
    pub kind: PartKind,
    /// Root of the template this copy came from
    pub template: NodeId,
    pub root: NodeId,
    pub start: AnchorFrame,
    pub end: AnchorFrame,
}

impl PartInstance {
    pub fn anchor(&self, role: AnchorRole) -> AnchorFrame {
        match role {
            AnchorRole::Start => self.start,
            AnchorRole::End => self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    fn authored(scene: &mut SceneGraph, anchors: &[&str]) -> NodeId {
        let root = scene.create_node("Part", None).unwrap();
        for name in anchors {
            scene.create_node(name, Some(root)).unwrap();
        }
        root
    }

    #[test]
    fn test_template_with_both_anchors_is_valid() {
        let mut scene = SceneGraph::new();
        let root = authored(&mut scene, &["Start", "End", "Mesh"]);
        let template = PartTemplate::resolve(&scene, root);
        assert!(template.is_valid());
        assert!(template.validate(&scene).is_ok());
        assert!(has_anchor_children(&scene, root));
    }

    #[test]
    fn test_template_missing_end_is_invalid() {
        let mut scene = SceneGraph::new();
        let root = authored(&mut scene, &["Start"]);
        let template = PartTemplate::resolve(&scene, root);
        assert!(!template.is_valid());
        assert_eq!(template.missing_anchor(), Some(AnchorRole::End));
        assert!(matches!(
            template.validate(&scene),
            Err(SwordError::InvalidTemplate {
                missing: AnchorRole::End,
                ..
            })
        ));
        assert!(!has_anchor_children(&scene, root));
    }

    #[test]
    fn test_nested_anchor_does_not_count() {
        let mut scene = SceneGraph::new();
        let root = authored(&mut scene, &["End"]);
        let holder = scene.create_node("Holder", Some(root)).unwrap();
        scene.create_node("Start", Some(holder)).unwrap();

        let template = PartTemplate::resolve(&scene, root);
        assert_eq!(template.missing_anchor(), Some(AnchorRole::Start));
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let scene = SceneGraph::new();
        let template = PartTemplate::resolve(&scene, uuid::Uuid::new_v4());
        assert!(!template.is_valid());
    }

    #[test]
    fn test_validate_sees_later_scene_changes() {
        let mut scene = SceneGraph::new();
        let root = authored(&mut scene, &["Start", "End"]);
        let template = PartTemplate::resolve(&scene, root);
        assert!(template.validate(&scene).is_ok());

        let end = scene.find_child(root, "End").unwrap();
        scene.destroy(end).unwrap();
        assert!(template.is_valid());
        assert!(matches!(
            template.validate(&scene),
            Err(SwordError::InvalidTemplate {
                missing: AnchorRole::End,
                ..
            })
        ));

        scene.destroy(root).unwrap();
        assert_eq!(
            template.validate(&scene),
            Err(SwordError::Scene(SceneError::NodeNotFound(root)))
        );
    }

    #[test]
    fn test_instantiate_resolves_copied_anchors() {
        let mut scene = SceneGraph::new();
        let root = authored(&mut scene, &["Start", "End"]);
        scene
            .set_local_pose(root, Pose::from_position(Vec3::new(9.0, 9.0, 9.0)))
            .unwrap();
        let holder = scene.create_node("Sword", None).unwrap();

        let template = PartTemplate::resolve(&scene, root);
        let instance = template
            .instantiate(&mut scene, PartKind::Grip, holder)
            .unwrap();

        assert_ne!(instance.root, root);
        assert_eq!(instance.template, root);
        assert_eq!(scene.parent(instance.root), Some(holder));
        assert_eq!(scene.local_pose(instance.root).unwrap(), Pose::IDENTITY);
        assert_eq!(scene.parent(instance.start.node), Some(instance.root));
        assert_eq!(instance.anchor(AnchorRole::End), instance.end);
    }

    #[test]
    fn test_instantiate_invalid_template_fails() {
        let mut scene = SceneGraph::new();
        let root = authored(&mut scene, &["End"]);
        let holder = scene.create_node("Sword", None).unwrap();
        let template = PartTemplate::resolve(&scene, root);

        assert!(template
            .instantiate(&mut scene, PartKind::Blade, holder)
            .is_err());
        assert!(scene.children(holder).is_empty());
    }
}
