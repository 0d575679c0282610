//! Core type definitions

mod kind;
mod pose;

pub use kind::*;
pub use pose::*;
