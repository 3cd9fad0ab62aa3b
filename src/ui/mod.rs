//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod prose;
mod widgets;

use crate::app::App;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let regions = layout::create_layout(frame.area());

    layout::draw_header(frame, regions.header, app);
    forms::draw_form_body(frame, regions.body, app);
    layout::draw_footer(frame, regions.footer, app);
    layout::draw_status_bar(frame, regions.status, app);

    // Submission errors are modal
    if let Some(message) = app.form.submission_error() {
        components::render_error_dialog(frame, message);
    }
}
