//! Modular Sword Assembly Core
//!
//! This crate assembles swords out of four interchangeable parts:
//! - Scene: arena of named nodes with local poses, behind `SceneService`
//! - PartTemplate / AnchorFrame: reusable parts with `Start` and `End` anchors
//! - TemplatePool: validated, de-duplicated templates per part kind
//! - Align: snaps one part's anchor onto another's
//! - SwordGenerator: picks templates at random and chains them into a sword
//! - TemplateLibrary: RON configuration of authored templates

pub mod align;
pub mod assembly;
pub mod error;
pub mod library;
pub mod part;
pub mod pool;
pub mod scene;
pub mod types;

pub use align::*;
pub use assembly::*;
pub use error::*;
pub use library::*;
pub use part::*;
pub use pool::*;
pub use scene::*;
pub use types::*;
