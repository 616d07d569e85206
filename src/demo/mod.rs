//! In-process demo host: a tiny world, the host's built-in placeholders and
//! an example plugin that registers its own.

pub mod host;
pub mod plugin;
pub mod world;
