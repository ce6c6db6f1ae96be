//! Recipe list screen rendering
//!
//! Renders the main list of recipes for the selected meal and diet type,
//! with a header showing the filter and connectivity, and a footer with key
//! hints, cache freshness and the current notification.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use foody::data::Recipe;

use crate::app::App;

/// Rows used by one recipe in the list
const ROWS_PER_RECIPE: usize = 2;

/// Strips HTML tags and common entities from a recipe summary
///
/// Whitespace runs are collapsed to a single space.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates text to `width` characters, ending with an ellipsis if cut
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// First recipe shown so that the selection stays visible
fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    selected.saturating_sub(visible - 1)
}

/// Renders a loading message while the first result is pending
pub fn render_loading(frame: &mut Frame) {
    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading recipes...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Renders the recipe list screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing recipes and selection
pub fn render_recipe_list(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Recipe list
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (network_text, network_color) = match app.network_available {
        Some(true) => ("● online", Color::Green),
        Some(false) => ("● offline", Color::Red),
        None => ("○", Color::DarkGray),
    };

    let mut spans = vec![
        Span::styled(
            "FOODY",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.current_filter.selected_meal_type.clone(),
            Style::default().fg(Color::White),
        ),
        Span::styled(" · ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.current_filter.selected_diet_type.clone(),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(network_text, Style::default().fg(network_color)),
    ];

    if app.is_loading {
        spans.push(Span::styled(
            "  loading…",
            Style::default().fg(Color::Yellow),
        ));
    }

    let separator = "─".repeat((area.width as usize).saturating_sub(2));
    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(separator, Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

/// Builds the two rows of one recipe
fn recipe_lines(recipe: &Recipe, is_selected: bool, width: usize) -> [Line<'static>; 2] {
    let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space

    let title_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let stats = format!(
        " ♥ {}  {} min",
        recipe.aggregate_likes, recipe.ready_in_minutes
    );
    let vegan = if recipe.vegan { "  vegan" } else { "" };
    let title_width = width.saturating_sub(2 + stats.chars().count() + vegan.len());

    let title = Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(truncate(&recipe.title, title_width), title_style),
        Span::styled(stats, Style::default().fg(Color::Yellow)),
        Span::styled(vegan, Style::default().fg(Color::Green)),
    ]);

    let summary = Line::from(vec![
        Span::raw("  "),
        Span::styled(
            truncate(&strip_html(&recipe.summary), width.saturating_sub(2)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    [title, summary]
}

fn list_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    if app.recipes.is_empty() {
        let message = if app.is_loading {
            "Loading recipes..."
        } else {
            "No recipes yet. Press r to fetch, f to change the filter."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(list_block(" Recipes ".to_string()));
        frame.render_widget(paragraph, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = area.height.saturating_sub(2) as usize / ROWS_PER_RECIPE;
    let offset = scroll_offset(app.selected_index, visible);

    let lines: Vec<Line> = app
        .recipes
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible.max(1))
        .flat_map(|(index, recipe)| {
            recipe_lines(recipe, index == app.selected_index, inner_width)
        })
        .collect();

    let title = format!(" Recipes ({}/{}) ", app.selected_index + 1, app.recipe_count());
    frame.render_widget(Paragraph::new(lines).block(list_block(title)), area);
}

/// Renders key hints, or the notification while one is shown
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref notification) = app.notification {
        let line = Line::from(Span::styled(
            format!(" {} ", notification.message),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut help_spans = vec![
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Filter  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    if let Some(cached_at) = app.cached_at {
        let elapsed = Local::now() - cached_at;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            " │ Cached: just now".to_string()
        } else if mins_ago < 60 {
            format!(" │ Cached: {}m ago", mins_ago)
        } else if elapsed.num_hours() < 48 {
            format!(" │ Cached: {}h ago", elapsed.num_hours())
        } else {
            format!(" │ Cached: {}d ago", elapsed.num_days())
        };
        help_spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
