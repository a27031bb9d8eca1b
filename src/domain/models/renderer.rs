use std::sync::Arc;

/// Turns raw message text into something safe to put on a display surface.
/// Implementations must be pure: the same input always renders the same way,
/// so a growing reply can be re-rendered from its full text on every delta.
pub trait Renderer {
    /// Renders assistant content, interpreting markdown where the surface
    /// supports it.
    fn render(&self, raw: &str) -> String;

    /// Makes user content safe without interpreting it.
    fn escape(&self, raw: &str) -> String;
}

pub type RendererBox = Arc<dyn Renderer + Send + Sync>;
