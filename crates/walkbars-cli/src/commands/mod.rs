//! CLI command implementations.

mod check;
mod precompile;
mod render;

pub use check::{run_check, CheckArgs};
pub use precompile::{run_precompile, PrecompileArgs};
pub use render::{run_render, RenderArgs};
