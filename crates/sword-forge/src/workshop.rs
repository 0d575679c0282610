//! Scene, generator and library wired together for one command run

use anyhow::Result;
use sword_core::{
    NodeId, PartKind, SceneGraph, SceneService, SwordGenerator, TemplateLibrary, TemplateSources,
    has_anchor_children,
};

pub struct Workshop {
    pub scene: SceneGraph,
    pub generator: SwordGenerator,
    pub sources: TemplateSources,
}

impl Workshop {
    /// Spawn the library into a fresh scene; optionally fill the pools
    pub fn open(library: &TemplateLibrary, populate: bool) -> Result<Self> {
        let mut scene = SceneGraph::new();
        let shelf = scene.create_node("Library", None)?;
        let owner = scene.create_node("Generator", None)?;
        let sources = library.spawn_into(&mut scene, Some(shelf))?;

        let mut generator = SwordGenerator::new(owner);
        if populate {
            let added = generator.populate_pools(&scene, &sources);
            tracing::debug!("Populated pools with {} templates", added);
        }

        Ok(Self {
            scene,
            generator,
            sources,
        })
    }

    /// (name, valid) for each authored candidate of `kind`
    pub fn candidate_status(&self, kind: PartKind) -> Vec<(String, bool)> {
        self.sources
            .for_kind(kind)
            .iter()
            .map(|&root| {
                let name = self.scene.name(root).unwrap_or_default().to_string();
                (name, has_anchor_children(&self.scene, root))
            })
            .collect()
    }

    /// Find a spawned composite by name
    pub fn composite(&self, name: &str) -> Option<NodeId> {
        self.sources
            .composites
            .iter()
            .copied()
            .find(|&root| self.scene.name(root) == Some(name))
    }
}
