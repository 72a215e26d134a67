use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use crate::models::{Task, TaskStatus};
use crate::tui::app::{App, FormField, InputMode};
use crate::tui::theme;

pub fn draw(frame: &mut Frame, app: &App) {
    // Fill the entire background
    let bg_block = Block::default().style(Style::default().bg(theme::BG));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_form(frame, app, chunks[1]);
    draw_tasks(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);

    match app.mode {
        InputMode::StatusPicker => draw_status_picker(frame, app),
        InputMode::HelpOverlay => draw_help(frame),
        InputMode::Normal | InputMode::Form => {}
    }
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let title_fg = if focused {
        theme::NEON_CYAN
    } else {
        theme::BORDER_DIM
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(focused))
        .title(Span::styled(
            title,
            Style::default().fg(title_fg).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme::BG))
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.store.tasks.len();
    let done = app
        .store
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();

    let mut spans = vec![
        Span::styled(
            format!("  {} ", theme::HEADER_ART),
            Style::default()
                .fg(theme::NEON_CYAN)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(theme::BORDER_DIM)),
        Span::styled(
            format!("{} ", theme::progress_bar(done, total, 10)),
            Style::default().fg(theme::NEON_GREEN),
        ),
        Span::styled(
            format!("{done}/{total} completed"),
            Style::default().fg(theme::NEON_MAGENTA),
        ),
    ];
    if app.in_flight > 0 {
        spans.push(Span::styled("  ⟳ syncing", theme::syncing_style()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::panel_border(false))
            .style(Style::default().bg(theme::BG)),
    );
    frame.render_widget(header, area);
}

fn form_line<'a>(label: &'a str, value: &'a str, hint: &'a str, active: bool) -> Line<'a> {
    let label_style = if active {
        Style::default()
            .fg(theme::NEON_CYAN)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::TEXT_DIM)
    };
    let mut spans = vec![
        Span::styled(label, label_style),
        Span::styled(value, Style::default().fg(theme::TEXT_BRIGHT)),
    ];
    if active {
        spans.push(Span::styled("▏", Style::default().fg(theme::NEON_CYAN)));
    }
    if value.is_empty() {
        spans.push(Span::styled(hint, Style::default().fg(theme::BORDER_DIM)));
    }
    Line::from(spans)
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == InputMode::Form;
    let draft = &app.store.draft;

    let status_line = match &app.form_error {
        Some(e) => Line::from(Span::styled(format!("  ✗ {e}"), theme::error_style())),
        None => Line::from(""),
    };

    let lines = vec![
        form_line(
            "  Title: ",
            &draft.title,
            "Task title",
            editing && app.form_field == FormField::Title,
        ),
        form_line(
            "  Due:   ",
            &draft.due_date,
            "YYYY-MM-DD",
            editing && app.form_field == FormField::DueDate,
        ),
        status_line,
    ];

    let title = if !editing && !draft.is_empty() {
        " New Task (unsaved) "
    } else {
        " New Task "
    };
    frame.render_widget(Paragraph::new(lines).block(panel(title, editing)), area);
}

fn task_item(task: &Task, selected: bool) -> ListItem<'_> {
    let marker = if selected { "▸ " } else { "  " };
    let marker_style = if selected {
        Style::default()
            .fg(theme::NEON_CYAN)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::TEXT_DIM)
    };
    let title_fg = if selected {
        theme::TEXT_BRIGHT
    } else {
        theme::TEXT_DIM
    };
    let status_style = theme::status_style(&task.status);

    ListItem::new(Line::from(vec![
        Span::styled(marker, marker_style),
        Span::styled(format!("{} ", theme::status_symbol(&task.status)), status_style),
        Span::styled(task.title.as_str(), Style::default().fg(title_fg)),
        Span::styled(
            format!("  Due: {}", task.due_date),
            Style::default().fg(theme::BORDER_DIM),
        ),
        Span::styled(format!("  [{}]", task.status), status_style),
    ]))
}

fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.mode == InputMode::Normal;
    let block = panel(" Tasks ", focused);

    if app.store.initial_load_pending() {
        let loading = Paragraph::new(Line::from(Span::styled(
            "  Loading tasks...",
            Style::default().fg(theme::TEXT_DIM),
        )))
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let items: Vec<ListItem> = app
        .store
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| task_item(task, i == app.selected_task_idx))
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help = match app.mode {
        InputMode::Normal => "  a: Add  j/k: Select  s: Status  r: Reload  ?: Help  q: Quit",
        InputMode::Form => "  Tab: Next field  Enter: Add task  Esc: Back",
        InputMode::StatusPicker => "  j/k: Choose  1-3: Pick  Enter: Apply  Esc: Cancel",
        InputMode::HelpOverlay => "  Esc: Close",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        help,
        Style::default().fg(theme::TEXT_DIM),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::panel_border(false))
            .title(Span::styled(" Help ", Style::default().fg(theme::TEXT_DIM)))
            .style(Style::default().bg(theme::BG)),
    );
    frame.render_widget(footer, area);
}

fn draw_status_picker(frame: &mut Frame, app: &App) {
    let area = theme::centered_rect(28, TaskStatus::ALL.len() as u16 + 2, frame.area());
    let items: Vec<ListItem> = TaskStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let selected = i == app.picker_idx;
            let marker = if selected { "▸ " } else { "  " };
            let style = if selected {
                theme::status_style(status).add_modifier(Modifier::REVERSED)
            } else {
                theme::status_style(status)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme::NEON_CYAN)),
                Span::styled(format!("{} {status}", theme::status_symbol(status)), style),
            ]))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(panel(" Status ", true)), area);
}

fn draw_help(frame: &mut Frame) {
    let rows = [
        ("a / n", "edit the new-task form"),
        ("Tab", "switch form field"),
        ("Enter", "add task / open status"),
        ("j / k", "move selection"),
        ("s", "change status"),
        ("r", "reload from Notion"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!("  {key:<7}"),
                    Style::default()
                        .fg(theme::NEON_CYAN)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(*desc, Style::default().fg(theme::TEXT_BRIGHT)),
            ])
        })
        .collect();

    let area = theme::centered_rect(44, rows.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(panel(" Keys ", true)), area);
}
