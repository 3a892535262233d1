pub mod renderer;
pub mod surface;
pub mod template;

pub use renderer::{FrameLayout, FrameRenderer, RendererError};
pub use surface::{Canvas, Element, Surface, SurfaceHandle, SurfaceRegistry};
pub use template::{FileTemplates, MemoryTemplates, TemplateSource};
