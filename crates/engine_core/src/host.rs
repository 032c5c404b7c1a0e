//! Boundary between the engine and whatever window system embeds it.

/// Native window identifiers handed over by the embedding application.
///
/// Values are opaque to the engine; a headless host leaves them at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowHandles {
    pub instance: u64,
    pub main_window: u64,
    pub draw_surface: u64,
}

/// Entry points a host window (editor widget, game window, headless runner)
/// drives the engine through.
pub trait EngineHost {
    fn initialize(&mut self, handles: WindowHandles) -> anyhow::Result<()>;
    fn shutdown(&mut self);
    /// Run one frame: advance the simulation and present.
    fn render(&mut self);
    fn resize(&mut self, width: u32, height: u32);
}
