use ratatui::layout::Rect;
use ratatui::Frame;

/// A piece of the screen that draws itself into a `Rect`.
///
/// Data arrives as props (struct fields) built fresh from the `Session` each
/// frame. `render` takes `&mut self` so stateful components can update
/// caches such as scroll offsets while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events.
pub trait EventHandler {
    /// The higher-level event this component reports to the loop.
    type Event;

    /// Handle a low-level `TuiEvent`; `Some` when the parent must react.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
