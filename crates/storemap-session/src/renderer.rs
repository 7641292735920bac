use storemap_core::{StoreRecord, Viewport};

/// The map surface. The session calls it with resolved results and never
/// asks how markers are drawn.
pub trait Renderer {
    /// Replace the visible markers.
    fn display_stores(&mut self, stores: &[&StoreRecord], clustering: bool);

    /// Center on one store and open its popup.
    fn focus_on_store(&mut self, store: &StoreRecord, viewport: Viewport);

    /// Move the map without changing markers.
    fn set_view(&mut self, viewport: Viewport);
}
