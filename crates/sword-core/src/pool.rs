//! Per-kind template pools

use rand::Rng;

use crate::error::{SwordError, SwordResult};
use crate::part::PartTemplate;
use crate::scene::{NodeId, SceneService};
use crate::types::PartKind;

/// Ordered collection of valid templates for one part kind
///
/// Only valid templates are stored, and each root appears at most once.
#[derive(Debug, Clone)]
pub struct TemplatePool {
    kind: PartKind,
    templates: Vec<PartTemplate>,
}

impl TemplatePool {
    pub fn new(kind: PartKind) -> Self {
        Self {
            kind,
            templates: Vec::new(),
        }
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartTemplate> {
        self.templates.iter()
    }

    pub fn contains(&self, root: NodeId) -> bool {
        self.templates.iter().any(|t| t.root() == root)
    }

    /// Resolve `candidate` as a template and append it
    ///
    /// Fails with `InvalidTemplate` if an anchor is missing, with a scene
    /// error if the root does not exist and with `DuplicateTemplate` if the
    /// root is already stored. The pool is unchanged on failure.
    pub fn try_add<S: SceneService + ?Sized>(
        &mut self,
        scene: &S,
        candidate: NodeId,
    ) -> SwordResult<()> {
        let template = PartTemplate::resolve(scene, candidate);
        template.validate(scene)?;

        if self.contains(candidate) {
            return Err(SwordError::DuplicateTemplate {
                kind: self.kind,
                root: candidate,
            });
        }

        self.templates.push(template);
        tracing::debug!(
            "Added {} template {:?} ({} in pool)",
            self.kind,
            scene.name(candidate).unwrap_or_default(),
            self.templates.len()
        );
        Ok(())
    }

    /// Add every candidate in order, logging the ones that are rejected
    ///
    /// Returns how many candidates were added.
    pub fn populate<S: SceneService + ?Sized>(&mut self, scene: &S, candidates: &[NodeId]) -> usize {
        let mut added = 0;
        for &candidate in candidates {
            match self.try_add(scene, candidate) {
                Ok(()) => added += 1,
                Err(SwordError::DuplicateTemplate { .. }) => {
                    tracing::debug!("Skipping duplicate {} template {}", self.kind, candidate);
                }
                Err(e) => {
                    tracing::warn!("Rejected {} template candidate: {}", self.kind, e);
                }
            }
        }
        added
    }

    /// Pick a template uniformly at random, or `None` if the pool is empty
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PartTemplate> {
        if self.templates.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.templates.len());
        self.templates.get(index)
    }

    /// Like [`pick_random`](Self::pick_random), but an empty pool is an error
    pub fn require_random<R: Rng + ?Sized>(&self, rng: &mut R) -> SwordResult<&PartTemplate> {
        self.pick_random(rng).ok_or(SwordError::EmptyPool(self.kind))
    }
}

/// One pool per part kind
#[derive(Debug, Clone)]
pub struct PartPools {
    pools: [TemplatePool; PartKind::COUNT],
}

impl Default for PartPools {
    fn default() -> Self {
        Self::new()
    }
}

impl PartPools {
    pub fn new() -> Self {
        Self {
            pools: [
                TemplatePool::new(PartKind::Blade),
                TemplatePool::new(PartKind::Guard),
                TemplatePool::new(PartKind::Grip),
                TemplatePool::new(PartKind::Pommel),
            ],
        }
    }

    pub fn get(&self, kind: PartKind) -> &TemplatePool {
        &self.pools[kind.index()]
    }

    pub fn get_mut(&mut self, kind: PartKind) -> &mut TemplatePool {
        &mut self.pools[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplatePool> {
        self.pools.iter()
    }

    /// Total number of templates across all kinds
    pub fn total(&self) -> usize {
        self.pools.iter().map(TemplatePool::len).sum()
    }
}
