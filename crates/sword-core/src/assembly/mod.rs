//! Sword composites and the configurations they are built from

mod generator;

pub use generator::{ImportOutcome, ImportReport, SwordGenerator};

use crate::align::{Relation, seam_gap, snap_after, snap_before};
use crate::error::{SwordError, SwordResult};
use crate::part::{PartInstance, PartTemplate};
use crate::scene::{NodeId, SceneService};
use crate::types::PartKind;

/// Per-kind slots of placed parts
pub type PartSlots = [Option<PartInstance>; PartKind::COUNT];

/// An assembled sword: one root node owning the placed parts
///
/// Chain: Grip stays at the origin, Guard after Grip, Blade after Guard,
/// Pommel before Grip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sword {
    root: NodeId,
    parts: PartSlots,
}

impl Sword {
    /// Name given to the composite's root node
    pub const ROOT_NAME: &'static str = "Sword";

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn part(&self, kind: PartKind) -> Option<&PartInstance> {
        self.parts[kind.index()].as_ref()
    }

    /// Placed parts in slot order
    pub fn instances(&self) -> impl Iterator<Item = &PartInstance> {
        self.parts.iter().flatten()
    }

    pub fn part_count(&self) -> usize {
        self.instances().count()
    }

    /// Largest anchor gap along the chain
    pub fn max_seam_gap<S: SceneService + ?Sized>(&self, scene: &S) -> SwordResult<f32> {
        let mut gap = 0.0_f32;
        for (source, target, relation) in CHAIN {
            if let (Some(s), Some(t)) = (self.part(source), self.part(target)) {
                gap = gap.max(seam_gap(scene, s, t, relation)?);
            }
        }
        Ok(gap)
    }

    /// Destroy every placed part, then the root
    pub fn destroy<S: SceneService + ?Sized>(mut self, scene: &mut S) -> SwordResult<()> {
        for slot in self.parts.iter_mut() {
            if let Some(instance) = slot.take()
                && scene.contains(instance.root)
            {
                scene.destroy(instance.root)?;
            }
        }
        if scene.contains(self.root) {
            scene.destroy(self.root)?;
        }
        Ok(())
    }
}

/// (source, target, relation) in the order the chain is applied
const CHAIN: [(PartKind, PartKind, Relation); 3] = [
    (PartKind::Guard, PartKind::Grip, Relation::After),
    (PartKind::Blade, PartKind::Guard, Relation::After),
    (PartKind::Pommel, PartKind::Grip, Relation::Before),
];

/// One template choice per part kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwordConfiguration {
    templates: [Option<PartTemplate>; PartKind::COUNT],
}

impl SwordConfiguration {
    pub fn new(
        blade: PartTemplate,
        guard: PartTemplate,
        grip: PartTemplate,
        pommel: PartTemplate,
    ) -> Self {
        Self {
            templates: [Some(blade), Some(guard), Some(grip), Some(pommel)],
        }
    }

    /// Read templates from the `Blade`, `Guard`, `Grip` and `Pommel` children of `root`
    ///
    /// Missing children leave the slot empty; present children are resolved
    /// whether or not they carry valid anchors.
    pub fn from_composite<S: SceneService + ?Sized>(scene: &S, root: NodeId) -> Self {
        let mut config = Self::default();
        for &kind in PartKind::all() {
            config.templates[kind.index()] = scene
                .find_child(root, kind.child_name())
                .map(|child| PartTemplate::resolve(scene, child));
        }
        config
    }

    pub fn template(&self, kind: PartKind) -> Option<&PartTemplate> {
        self.templates[kind.index()].as_ref()
    }

    pub fn set_template(&mut self, kind: PartKind, template: PartTemplate) {
        self.templates[kind.index()] = Some(template);
    }

    /// Every slot is filled with a valid template
    pub fn validate<S: SceneService + ?Sized>(&self, scene: &S) -> SwordResult<()> {
        for &kind in PartKind::all() {
            self.template(kind)
                .ok_or(SwordError::MissingPart(kind))?
                .validate(scene)?;
        }
        Ok(())
    }

    /// Instance every template under `root` and chain the parts together
    ///
    /// Nothing is created if the configuration is incomplete. If the scene
    /// fails part way, the parts created so far are destroyed again.
    pub fn build_onto<S: SceneService + ?Sized>(
        &self,
        scene: &mut S,
        root: NodeId,
    ) -> SwordResult<Sword> {
        self.validate(&*scene)?;

        let mut sword = Sword {
            root,
            parts: Default::default(),
        };
        if let Err(e) = self.place_parts(scene, &mut sword) {
            for instance in sword.parts.iter().flatten() {
                if scene.contains(instance.root)
                    && let Err(cleanup) = scene.destroy(instance.root)
                {
                    tracing::warn!("Failed to remove unfinished {}: {}", instance.kind, cleanup);
                }
            }
            return Err(e);
        }
        Ok(sword)
    }

    fn place_parts<S: SceneService + ?Sized>(
        &self,
        scene: &mut S,
        sword: &mut Sword,
    ) -> SwordResult<()> {
        for kind in [PartKind::Grip, PartKind::Guard, PartKind::Blade, PartKind::Pommel] {
            let template = self.template(kind).ok_or(SwordError::MissingPart(kind))?;
            sword.parts[kind.index()] = Some(template.instantiate(scene, kind, sword.root)?);
        }

        let [Some(blade), Some(guard), Some(grip), Some(pommel)] = sword.parts else {
            return Err(SwordError::MissingPart(PartKind::Grip));
        };
        snap_after(scene, &guard, &grip)?;
        snap_after(scene, &blade, &guard)?;
        snap_before(scene, &pommel, &grip)?;
        Ok(())
    }
}
