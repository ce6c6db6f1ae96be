//! Meal and diet type selection sheet
//!
//! Renders two rows of chips over the bottom of the recipe list. The focused
//! row is marked and the highlighted chip in each row is inverted.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use foody::data::{DIET_TYPES, MEAL_TYPES};

use crate::app::{App, FilterGroup};

/// Height of the sheet including borders
const SHEET_HEIGHT: u16 = 14;

/// Builds a row of chips with `selected` highlighted
fn chip_line(labels: &[&str], selected: usize, focused: bool) -> Line<'static> {
    let mut spans = Vec::with_capacity(labels.len() * 2);

    for (index, label) in labels.iter().enumerate() {
        let style = if index == selected {
            let base = Style::default().fg(Color::Black).bg(if focused {
                Color::Cyan
            } else {
                Color::Gray
            });
            base.add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw(" "));
    }

    Line::from(spans)
}

fn group_title(title: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "\u{25B8} " } else { "  " };
    let style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(format!("{}{}", marker, title), style))
}

/// Area of the sheet, anchored to the bottom of the screen
fn sheet_area(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(SHEET_HEIGHT)])
        .split(area);
    chunks[1]
}

/// Renders the filter sheet on top of the current view
pub fn render(frame: &mut Frame, app: &App) {
    let area = sheet_area(frame.area());
    frame.render_widget(Clear, area);

    let meal_focused = app.filter_group == FilterGroup::Meal;
    let diet_focused = app.filter_group == FilterGroup::Diet;

    let lines = vec![
        group_title("Meal Type", meal_focused),
        chip_line(&MEAL_TYPES, app.filter_meal_index, meal_focused),
        Line::from(""),
        group_title("Diet Type", diet_focused),
        chip_line(&DIET_TYPES, app.filter_diet_index, diet_focused),
        Line::from(""),
        Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" Switch  "),
            Span::styled("←/→", Style::default().fg(Color::Yellow)),
            Span::raw(" Choose  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Apply  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]),
    ];

    let block = Block::default()
        .title(" Filter ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::offline_app;
    use crate::app::AppState;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_filter_sheet_renders_both_groups() {
        let mut app = offline_app();
        app.state = AppState::FilterSheet;
        app.filter_group = FilterGroup::Diet;

        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(content.contains("Meal Type"));
        assert!(content.contains("Diet Type"));
        assert!(content.contains("main course"));
        assert!(content.contains("whole30"));
    }

    #[test]
    fn test_chip_line_highlights_selection() {
        let line = chip_line(&["a", "b", "c"], 1, true);
        assert_eq!(line.spans.len(), 6);
        assert_eq!(line.spans[2].content, " b ");
        assert_eq!(line.spans[2].style.bg, Some(Color::Cyan));
        assert_eq!(line.spans[0].style.bg, None);
    }
}
