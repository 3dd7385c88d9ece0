use super::theme::Theme;
use crate::{
    app::{Action, ActiveView, AppContext, AppResult, AppView},
    components::Component,
};
use ratatui::{Frame, layout::Rect, text::Line, widgets::Tabs};

#[derive(Debug, Default)]
pub struct TabBar;

impl Component for TabBar {
    type Command = ();

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        _command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let theme = Theme::new(ctx.state.no_colors);
        let titles = ActiveView::ALL
            .iter()
            .enumerate()
            .map(|(index, view)| Line::from(format!("[{}] {}", index + 1, view.title())));
        let tabs = Tabs::new(titles)
            .select(ctx.state.ui.active_view.index())
            .style(theme.muted())
            .highlight_style(theme.selected())
            .divider("  ");
        frame.render_widget(tabs, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
