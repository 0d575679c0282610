//! Template library configuration
//!
//! A library is a RON document listing authored part objects per kind, plus
//! authored whole swords to import. Spawning it into a scene yields the
//! ordered candidate lists the template pools are populated from.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, SceneError, SceneService};
use crate::types::{AnchorRole, PartKind, Pose};

/// Library loading errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LibraryError {
    #[error("IO error at '{path}': {message}")]
    Io { path: String, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Unsupported library version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// An authored node: name, local pose and children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub xyz: [f32; 3],
    /// Roll, pitch, yaw in radians
    #[serde(default)]
    pub rpy: [f32; 3],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xyz: [0.0; 3],
            rpy: [0.0; 3],
            children: Vec::new(),
        }
    }

    /// A part with `Start` and `End` anchors at the given local positions
    pub fn part(name: impl Into<String>, start: [f32; 3], end: [f32; 3]) -> Self {
        Self::new(name)
            .with_child(NodeSpec::new(AnchorRole::Start.node_name()).xyz(start[0], start[1], start[2]))
            .with_child(NodeSpec::new(AnchorRole::End.node_name()).xyz(end[0], end[1], end[2]))
    }

    pub fn xyz(mut self, x: f32, y: f32, z: f32) -> Self {
        self.xyz = [x, y, z];
        self
    }

    pub fn rpy(mut self, roll: f32, pitch: f32, yaw: f32) -> Self {
        self.rpy = [roll, pitch, yaw];
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn pose(&self) -> Pose {
        Pose::from_xyz_rpy(self.xyz, self.rpy)
    }

    /// Create this node and its descendants in `scene`
    pub fn spawn<S: SceneService + ?Sized>(
        &self,
        scene: &mut S,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let id = scene.create_node(&self.name, parent)?;
        scene.set_local_pose(id, self.pose())?;
        for child in &self.children {
            child.spawn(scene, Some(id))?;
        }
        Ok(id)
    }
}

/// Generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Fixed seed for reproducible swords; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Largest anchor gap accepted as connected
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
}

fn default_epsilon() -> f32 {
    1e-4
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: None,
            epsilon: default_epsilon(),
        }
    }
}

/// Authored part templates grouped by kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateLibrary {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub settings: GeneratorSettings,
    #[serde(default)]
    pub blades: Vec<NodeSpec>,
    #[serde(default)]
    pub guards: Vec<NodeSpec>,
    #[serde(default)]
    pub grips: Vec<NodeSpec>,
    #[serde(default)]
    pub pommels: Vec<NodeSpec>,
    /// Whole swords whose named children are imported into the pools
    #[serde(default)]
    pub composites: Vec<NodeSpec>,
}

impl TemplateLibrary {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LibraryError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let library = Self::from_ron_str(&content)?;
        tracing::info!("Loaded template library from {:?}", path);
        Ok(library)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LibraryError> {
        let path = path.as_ref();
        let content = self.to_ron_string()?;
        std::fs::write(path, content).map_err(|e| LibraryError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!("Saved template library to {:?}", path);
        Ok(())
    }

    pub fn from_ron_str(content: &str) -> Result<Self, LibraryError> {
        let library: Self = ron::from_str(content).map_err(|e| LibraryError::Parse(e.to_string()))?;
        if library.version > Self::CURRENT_VERSION {
            return Err(LibraryError::UnsupportedVersion {
                found: library.version,
                supported: Self::CURRENT_VERSION,
            });
        }
        Ok(library)
    }

    pub fn to_ron_string(&self) -> Result<String, LibraryError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LibraryError::Serialize(e.to_string()))
    }

    pub fn specs(&self, kind: PartKind) -> &[NodeSpec] {
        match kind {
            PartKind::Blade => &self.blades,
            PartKind::Guard => &self.guards,
            PartKind::Grip => &self.grips,
            PartKind::Pommel => &self.pommels,
        }
    }

    fn specs_mut(&mut self, kind: PartKind) -> &mut Vec<NodeSpec> {
        match kind {
            PartKind::Blade => &mut self.blades,
            PartKind::Guard => &mut self.guards,
            PartKind::Grip => &mut self.grips,
            PartKind::Pommel => &mut self.pommels,
        }
    }

    pub fn add(&mut self, kind: PartKind, spec: NodeSpec) {
        self.specs_mut(kind).push(spec);
    }

    /// Create every authored object under `parent`, keeping authoring order
    pub fn spawn_into<S: SceneService + ?Sized>(
        &self,
        scene: &mut S,
        parent: Option<NodeId>,
    ) -> Result<TemplateSources, SceneError> {
        let mut sources = TemplateSources::default();
        for &kind in PartKind::all() {
            for spec in self.specs(kind) {
                let id = spec.spawn(scene, parent)?;
                sources.for_kind_mut(kind).push(id);
            }
        }
        for spec in &self.composites {
            sources.composites.push(spec.spawn(scene, parent)?);
        }
        Ok(sources)
    }

    /// A small armory with a few parts of each kind
    pub fn sample() -> Self {
        let mut library = Self::new();
        library.settings.seed = Some(7);

        library.add(PartKind::Blade, NodeSpec::part("Longblade", [0.0; 3], [0.0, 0.0, 3.0]));
        library.add(PartKind::Blade, NodeSpec::part("Shortblade", [0.0; 3], [0.0, 0.0, 1.8]));
        library.add(PartKind::Guard, NodeSpec::part("Crossguard", [0.0, 0.0, -0.05], [0.0, 0.0, 0.05]));
        library.add(PartKind::Guard, NodeSpec::part("Disc", [0.0; 3], [0.0, 0.0, 0.2]));
        library.add(PartKind::Grip, NodeSpec::part("Wrapped", [0.0; 3], [0.0, 0.0, 1.0]));
        library.add(PartKind::Grip, NodeSpec::part("Hand-and-a-half", [0.0; 3], [0.0, 0.0, 1.4]));
        library.add(PartKind::Pommel, NodeSpec::part("Wheel", [0.0, 0.0, -0.1], [0.0, 0.0, 0.1]));
        library.add(PartKind::Pommel, NodeSpec::part("Scent stopper", [0.0, 0.0, -0.3], [0.0; 3]));

        library.composites.push(
            NodeSpec::new("Arming sword")
                .with_child(NodeSpec::part("Blade", [0.0; 3], [0.0, 0.0, 2.6]))
                .with_child(NodeSpec::part("Guard", [0.0; 3], [0.0, 0.0, 0.1]).xyz(0.0, 0.0, 0.9))
                .with_child(NodeSpec::part("Grip", [0.0; 3], [0.0, 0.0, 0.9]))
                .with_child(NodeSpec::part("Pommel", [0.0, 0.0, -0.15], [0.0; 3])),
        );
        library
    }
}

/// Ordered candidate roots per part kind, as spawned from a library
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSources {
    pub blades: Vec<NodeId>,
    pub guards: Vec<NodeId>,
    pub grips: Vec<NodeId>,
    pub pommels: Vec<NodeId>,
    pub composites: Vec<NodeId>,
}

impl TemplateSources {
    pub fn for_kind(&self, kind: PartKind) -> &[NodeId] {
        match kind {
            PartKind::Blade => &self.blades,
            PartKind::Guard => &self.guards,
            PartKind::Grip => &self.grips,
            PartKind::Pommel => &self.pommels,
        }
    }

    pub fn for_kind_mut(&mut self, kind: PartKind) -> &mut Vec<NodeId> {
        match kind {
            PartKind::Blade => &mut self.blades,
            PartKind::Guard => &mut self.guards,
            PartKind::Grip => &mut self.grips,
            PartKind::Pommel => &mut self.pommels,
        }
    }
}
