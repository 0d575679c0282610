//! Randomized sword generation over template pools

use rand::Rng;

use crate::error::{SwordError, SwordResult};
use crate::library::TemplateSources;
use crate::part::PartTemplate;
use crate::pool::PartPools;
use crate::scene::{NodeId, SceneService};
use crate::types::{PartKind, Pose};

use super::{Sword, SwordConfiguration};

/// What happened to one part kind during an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Added,
    Duplicate,
    /// Child present but missing an anchor
    Invalid,
    /// Child is part of the generator's own sword
    Generated,
    /// No child with the part's name
    Missing,
}

/// Per-kind outcome of [`SwordGenerator::import_template`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    outcomes: [ImportOutcome; PartKind::COUNT],
}

impl ImportReport {
    pub fn outcome(&self, kind: PartKind) -> ImportOutcome {
        self.outcomes[kind.index()]
    }

    /// Number of pools that gained a template
    pub fn added(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == ImportOutcome::Added)
            .count()
    }
}

/// Owns the four template pools and at most one generated sword
///
/// Not synchronized: callers serialize `randomize`, `clear` and
/// `import_template` on a given generator.
#[derive(Debug)]
pub struct SwordGenerator {
    /// Node the generated sword is parented under
    owner: NodeId,
    pools: PartPools,
    sword: Option<Sword>,
}

impl SwordGenerator {
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            pools: PartPools::new(),
            sword: None,
        }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn pools(&self) -> &PartPools {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut PartPools {
        &mut self.pools
    }

    /// The current sword, if one has been generated
    pub fn sword(&self) -> Option<&Sword> {
        self.sword.as_ref()
    }

    /// Fill the pools from configured candidate lists and import composites
    ///
    /// Returns the number of templates added.
    pub fn populate_pools<S: SceneService + ?Sized>(
        &mut self,
        scene: &S,
        sources: &TemplateSources,
    ) -> usize {
        let mut added = 0;
        for &kind in PartKind::all() {
            added += self.pools.get_mut(kind).populate(scene, sources.for_kind(kind));
        }
        for &composite in &sources.composites {
            added += self.import_template(scene, composite).added();
        }
        tracing::info!(
            "Template pools hold {} blades, {} guards, {} grips, {} pommels",
            self.pools.get(PartKind::Blade).len(),
            self.pools.get(PartKind::Guard).len(),
            self.pools.get(PartKind::Grip).len(),
            self.pools.get(PartKind::Pommel).len()
        );
        added
    }

    /// Pick one template per kind
    ///
    /// Fails with `EmptyPool` for the first kind without templates.
    pub fn pick_configuration<R: Rng + ?Sized>(&self, rng: &mut R) -> SwordResult<SwordConfiguration> {
        let mut pick = |kind: PartKind| -> SwordResult<PartTemplate> {
            Ok(self.pools.get(kind).require_random(rng)?.clone())
        };
        Ok(SwordConfiguration::new(
            pick(PartKind::Blade)?,
            pick(PartKind::Guard)?,
            pick(PartKind::Grip)?,
            pick(PartKind::Pommel)?,
        ))
    }

    /// Replace the current sword with a freshly randomized one
    ///
    /// Templates are chosen and checked against the scene before anything is
    /// destroyed, so an empty pool or a template that no longer resolves
    /// leaves the previous sword in place.
    pub fn randomize<S: SceneService + ?Sized, R: Rng + ?Sized>(
        &mut self,
        scene: &mut S,
        rng: &mut R,
    ) -> SwordResult<&Sword> {
        let config = self.pick_configuration(rng)?;
        config.validate(&*scene)?;

        self.clear(scene)?;

        let root = scene.create_node(Sword::ROOT_NAME, Some(self.owner))?;
        scene.set_local_pose(root, Pose::IDENTITY)?;

        let sword = match config.build_onto(scene, root) {
            Ok(sword) => sword,
            Err(e) => {
                if let Err(cleanup) = scene.destroy(root) {
                    tracing::warn!("Failed to remove unfinished sword {}: {}", root, cleanup);
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Randomized sword: {}",
            PartKind::all()
                .iter()
                .filter_map(|kind| {
                    let template = config.template(*kind)?;
                    Some(format!(
                        "{}={}",
                        kind,
                        scene.name(template.root()).unwrap_or("?")
                    ))
                })
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(&*self.sword.insert(sword))
    }

    /// Destroy the current sword; no-op when there is none
    pub fn clear<S: SceneService + ?Sized>(&mut self, scene: &mut S) -> SwordResult<()> {
        let Some(sword) = self.sword.take() else {
            return Ok(());
        };
        tracing::debug!("Clearing sword {}", sword.root());
        sword.destroy(scene)
    }

    /// Add the parts of an authored sword to the pools
    ///
    /// Looks for `Blade`, `Guard`, `Grip` and `Pommel` children of `root`;
    /// each valid one not already pooled is appended to its pool. Parts of
    /// the generator's current sword are never pooled, since the next
    /// rebuild destroys them.
    pub fn import_template<S: SceneService + ?Sized>(
        &mut self,
        scene: &S,
        root: NodeId,
    ) -> ImportReport {
        let config = SwordConfiguration::from_composite(scene, root);
        let mut outcomes = [ImportOutcome::Missing; PartKind::COUNT];

        for &kind in PartKind::all() {
            let Some(template) = config.template(kind) else {
                tracing::warn!(
                    "{:?} has no {} child",
                    scene.name(root).unwrap_or_default(),
                    kind
                );
                continue;
            };
            if self.is_generated(scene, template.root()) {
                tracing::warn!("Skipping imported {}: part of the generated sword", kind);
                outcomes[kind.index()] = ImportOutcome::Generated;
                continue;
            }
            outcomes[kind.index()] = match self.pools.get_mut(kind).try_add(scene, template.root()) {
                Ok(()) => ImportOutcome::Added,
                Err(SwordError::DuplicateTemplate { .. }) => ImportOutcome::Duplicate,
                Err(e) => {
                    tracing::warn!("Skipping imported {}: {}", kind, e);
                    ImportOutcome::Invalid
                }
            };
        }

        ImportReport { outcomes }
    }

    /// `node` is the current sword's root or lies below it
    fn is_generated<S: SceneService + ?Sized>(&self, scene: &S, node: NodeId) -> bool {
        let Some(sword) = &self.sword else {
            return false;
        };
        let mut current = Some(node);
        while let Some(id) = current {
            if id == sword.root() {
                return true;
            }
            current = scene.parent(id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::scene::{SceneError, SceneGraph};

    fn authored(scene: &mut SceneGraph, parent: Option<NodeId>, name: &str, anchors: bool) -> NodeId {
        let root = scene.create_node(name, parent).unwrap();
        if anchors {
            scene.create_node("Start", Some(root)).unwrap();
            scene.create_node("End", Some(root)).unwrap();
        }
        root
    }

    /// Scene whose instancing fails once `instances_left` runs out
    #[derive(Default)]
    struct FlakyScene {
        inner: SceneGraph,
        instances_left: Option<usize>,
        fail_destroy: bool,
    }

    impl SceneService for FlakyScene {
        fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
            self.inner.create_node(name, parent)
        }

        fn instantiate(
            &mut self,
            source: NodeId,
            parent: Option<NodeId>,
        ) -> Result<NodeId, SceneError> {
            match &mut self.instances_left {
                Some(0) => Err(SceneError::NodeNotFound(source)),
                Some(left) => {
                    *left -= 1;
                    self.inner.instantiate(source, parent)
                }
                None => self.inner.instantiate(source, parent),
            }
        }

        fn destroy(&mut self, node: NodeId) -> Result<(), SceneError> {
            if self.fail_destroy {
                return Err(SceneError::NodeNotFound(node));
            }
            self.inner.destroy(node)
        }

        fn contains(&self, node: NodeId) -> bool {
            self.inner.contains(node)
        }

        fn name(&self, node: NodeId) -> Option<&str> {
            self.inner.name(node)
        }

        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.inner.parent(node)
        }

        fn children(&self, node: NodeId) -> Vec<NodeId> {
            self.inner.children(node)
        }

        fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
            self.inner.find_child(node, name)
        }

        fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
            self.inner.set_parent(node, parent)
        }

        fn local_pose(&self, node: NodeId) -> Result<Pose, SceneError> {
            self.inner.local_pose(node)
        }

        fn set_local_pose(&mut self, node: NodeId, pose: Pose) -> Result<(), SceneError> {
            self.inner.set_local_pose(node, pose)
        }

        fn world_pose(&self, node: NodeId) -> Result<Pose, SceneError> {
            self.inner.world_pose(node)
        }
    }

    /// Generator with one template of each kind
    fn stocked(scene: &mut FlakyScene) -> SwordGenerator {
        let owner = scene.inner.create_node("Generator", None).unwrap();
        let template = scene.inner.create_node("Template", None).unwrap();
        for &kind in PartKind::all() {
            authored(&mut scene.inner, Some(template), kind.child_name(), true);
        }
        let mut generator = SwordGenerator::new(owner);
        assert_eq!(generator.import_template(&*scene, template).added(), 4);
        generator
    }

    fn pooled(generator: &SwordGenerator, kind: PartKind) -> NodeId {
        generator.pools().get(kind).iter().next().unwrap().root()
    }

    #[test]
    fn test_clear_without_sword_is_noop() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Generator", None).unwrap();
        let mut generator = SwordGenerator::new(owner);
        assert!(generator.clear(&mut scene).is_ok());
        assert!(generator.sword().is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_randomize_with_empty_pool_fails() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Generator", None).unwrap();
        let mut generator = SwordGenerator::new(owner);
        let mut rng = StdRng::seed_from_u64(1);

        let err = generator.randomize(&mut scene, &mut rng).unwrap_err();
        assert_eq!(err, SwordError::EmptyPool(PartKind::Blade));
        assert!(scene.children(owner).is_empty());
    }

    #[test]
    fn test_import_reports_each_kind() {
        let mut scene = SceneGraph::new();
        let owner = scene.create_node("Generator", None).unwrap();
        let template = scene.create_node("Template", None).unwrap();
        authored(&mut scene, Some(template), "Blade", true);
        authored(&mut scene, Some(template), "Guard", false);
        authored(&mut scene, Some(template), "Grip", true);

        let mut generator = SwordGenerator::new(owner);
        let report = generator.import_template(&scene, template);
        assert_eq!(report.outcome(PartKind::Blade), ImportOutcome::Added);
        assert_eq!(report.outcome(PartKind::Guard), ImportOutcome::Invalid);
        assert_eq!(report.outcome(PartKind::Grip), ImportOutcome::Added);
        assert_eq!(report.outcome(PartKind::Pommel), ImportOutcome::Missing);
        assert_eq!(report.added(), 2);

        let again = generator.import_template(&scene, template);
        assert_eq!(again.outcome(PartKind::Blade), ImportOutcome::Duplicate);
        assert_eq!(again.added(), 0);
        assert_eq!(generator.pools().total(), 2);
    }

    #[test]
    fn test_failed_build_removes_partial_sword() {
        let mut scene = FlakyScene::default();
        let mut generator = stocked(&mut scene);
        let owner = generator.owner();
        let baseline = scene.inner.len();
        let mut rng = StdRng::seed_from_u64(4);

        generator.randomize(&mut scene, &mut rng).unwrap();

        // Grip and Guard are placed, Blade fails
        scene.instances_left = Some(2);
        let err = generator.randomize(&mut scene, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SwordError::Scene(SceneError::NodeNotFound(pooled(&generator, PartKind::Blade)))
        );

        // The old sword was cleared before building, so none is held
        assert!(generator.sword().is_none());
        assert!(scene.children(owner).is_empty());
        assert_eq!(scene.inner.len(), baseline);

        scene.instances_left = None;
        let sword = generator.randomize(&mut scene, &mut rng).unwrap();
        assert_eq!(sword.part_count(), 4);
    }

    #[test]
    fn test_failed_cleanup_keeps_build_error() {
        let mut scene = FlakyScene::default();
        let mut generator = stocked(&mut scene);
        let mut rng = StdRng::seed_from_u64(4);

        scene.instances_left = Some(1);
        scene.fail_destroy = true;
        let err = generator.randomize(&mut scene, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SwordError::Scene(SceneError::NodeNotFound(pooled(&generator, PartKind::Guard)))
        );
        assert!(generator.sword().is_none());
    }

    #[test]
    fn test_import_skips_generated_parts() {
        let mut scene = FlakyScene::default();
        let mut generator = stocked(&mut scene);
        let mut rng = StdRng::seed_from_u64(8);

        let sword = generator.randomize(&mut scene, &mut rng).unwrap().clone();
        let report = generator.import_template(&scene, sword.root());
        assert_eq!(report.outcome(PartKind::Grip), ImportOutcome::Generated);
        assert_eq!(report.added(), 0);
        assert_eq!(generator.pools().total(), 4);

        // Once the sword is gone its nodes are no longer protected
        generator.clear(&mut scene).unwrap();
        assert!(!generator.is_generated(&scene, sword.root()));
    }
}
