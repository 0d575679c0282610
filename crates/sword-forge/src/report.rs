//! Human and JSON readable description of a built sword

use std::fmt;

use serde::Serialize;
use sword_core::{PartKind, SceneService, Sword, SwordResult};

#[derive(Debug, Serialize)]
pub struct PartReport {
    pub kind: PartKind,
    pub template: String,
    pub position: [f32; 3],
    pub forward: [f32; 3],
    pub start: [f32; 3],
    pub end: [f32; 3],
}

#[derive(Debug, Serialize)]
pub struct SwordReport {
    pub parts: Vec<PartReport>,
    /// Distance from pommel bottom to blade tip
    pub length: f32,
    pub max_gap: f32,
    pub connected: bool,
}

impl SwordReport {
    pub fn new<S: SceneService>(scene: &S, sword: &Sword, epsilon: f32) -> SwordResult<Self> {
        let mut parts = Vec::with_capacity(PartKind::COUNT);
        for instance in sword.instances() {
            parts.push(PartReport {
                kind: instance.kind,
                template: scene.name(instance.template).unwrap_or("?").to_string(),
                position: scene.world_position(instance.root)?.to_array(),
                forward: scene.forward(instance.root)?.to_array(),
                start: instance.start.world_position(scene)?.to_array(),
                end: instance.end.world_position(scene)?.to_array(),
            });
        }

        let length = match (sword.part(PartKind::Pommel), sword.part(PartKind::Blade)) {
            (Some(pommel), Some(blade)) => pommel
                .start
                .world_position(scene)?
                .distance(blade.end.world_position(scene)?),
            _ => 0.0,
        };
        let max_gap = sword.max_seam_gap(scene)?;

        Ok(Self {
            parts,
            length,
            max_gap,
            connected: max_gap <= epsilon,
        })
    }
}

impl fmt::Display for SwordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<7} {:<20} {:>26} {:>26}", "part", "template", "start", "end")?;
        for part in &self.parts {
            writeln!(
                f,
                "{:<7} {:<20} {:>26} {:>26}",
                part.kind.to_string(),
                part.template,
                fmt_point(part.start),
                fmt_point(part.end)
            )?;
        }
        writeln!(f, "length {:.3}, largest seam gap {:.2e}", self.length, self.max_gap)
    }
}

fn fmt_point(p: [f32; 3]) -> String {
    format!("({:.3}, {:.3}, {:.3})", p[0], p[1], p[2])
}
