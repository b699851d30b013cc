// Core model and algorithms. Nothing in here touches the filesystem.

pub mod builder;
pub mod callgraph;
pub mod classifier;
pub mod coupling;
pub mod declarations;
pub mod format;
pub mod index;
pub mod resolver;
pub mod stats;
