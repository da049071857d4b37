//! The translucent shaded panel composited over the tree scene.

mod render;
pub mod shader;
pub mod state;

pub use render::PanelSurface;
pub use shader::PanelMode;
pub use state::{PanelRect, PanelState, panel_scale};
