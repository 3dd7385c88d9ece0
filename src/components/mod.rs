use crate::app::{Action, AppContext, AppResult, AppView};
use ratatui::Frame;
use ratatui::layout::Rect;

/// Implemented by every view and bar drawn by [`crate::app::App`].
pub trait Component {
    /// Input the component understands. Anything with app-wide effect is
    /// returned as an [`Action`].
    type Command;

    /// One-off setup, run before the first frame.
    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()>;

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>>;

    /// Draw into `area`. Rendering never mutates application state.
    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>);

    /// Called once per loop iteration; used to issue cache reads and flush
    /// paste buffers.
    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>>;
}
