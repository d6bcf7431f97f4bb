//! Workspace dependency analysis
//!
//! Two pieces, used in this order:
//! - **descriptors**: app → declared lib dependencies, from `project.json` files
//! - **affected**: changed files → affected apps/libs, with lib → app propagation

pub mod affected;
pub mod descriptors;

pub use affected::{ChangeClassifier, Changes};
pub use descriptors::{DependencyIndex, FsDescriptorSource};
