//! Part kind and anchor role definitions

use serde::{Deserialize, Serialize};

/// Which slot of the sword a part fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    Blade,
    Guard,
    Grip,
    Pommel,
}

impl PartKind {
    /// Number of part kinds in a complete sword
    pub const COUNT: usize = 4;

    /// Child name used for this part inside an authored composite
    pub fn child_name(&self) -> &'static str {
        match self {
            PartKind::Blade => "Blade",
            PartKind::Guard => "Guard",
            PartKind::Grip => "Grip",
            PartKind::Pommel => "Pommel",
        }
    }

    /// Slot index into per-kind arrays
    pub fn index(&self) -> usize {
        match self {
            PartKind::Blade => 0,
            PartKind::Guard => 1,
            PartKind::Grip => 2,
            PartKind::Pommel => 3,
        }
    }

    /// All part kinds, in slot order
    pub fn all() -> &'static [PartKind] {
        &[
            PartKind::Blade,
            PartKind::Guard,
            PartKind::Grip,
            PartKind::Pommel,
        ]
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.child_name())
    }
}

/// Role of an anchor frame on a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorRole {
    Start,
    End,
}

impl AnchorRole {
    /// Child name the anchor is looked up by
    pub fn node_name(&self) -> &'static str {
        match self {
            AnchorRole::Start => "Start",
            AnchorRole::End => "End",
        }
    }
}

impl std::fmt::Display for AnchorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.node_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_slot_order() {
        for (i, kind) in PartKind::all().iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(PartKind::all().len(), PartKind::COUNT);
    }

    #[test]
    fn test_names() {
        assert_eq!(PartKind::Pommel.to_string(), "Pommel");
        assert_eq!(AnchorRole::Start.node_name(), "Start");
        assert_eq!(AnchorRole::End.to_string(), "End");
    }
}
