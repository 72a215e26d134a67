use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

use crate::models::TaskStatus;

// ── Color palette ──────────────────────────────────────────────────

pub const BG: Color = Color::Rgb(0x0a, 0x0a, 0x0f);
pub const NEON_CYAN: Color = Color::Rgb(0x00, 0xff, 0xf5);
pub const NEON_MAGENTA: Color = Color::Rgb(0xff, 0x00, 0xff);
pub const NEON_PINK: Color = Color::Rgb(0xff, 0x2d, 0x6f);
pub const NEON_GREEN: Color = Color::Rgb(0x39, 0xff, 0x14);
pub const NEON_ORANGE: Color = Color::Rgb(0xff, 0x6e, 0x27);
pub const TEXT_DIM: Color = Color::Rgb(0xb0, 0xb0, 0xb0);
pub const TEXT_BRIGHT: Color = Color::Rgb(0xff, 0xff, 0xff);
pub const BORDER_DIM: Color = Color::Rgb(0x00, 0x5f, 0x5f);
pub const BORDER_BRIGHT: Color = Color::Rgb(0x00, 0xff, 0xf5);

// ── Style presets ──────────────────────────────────────────────────

pub fn panel_border(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(BORDER_BRIGHT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_DIM)
    }
}

pub fn status_style(status: &TaskStatus) -> Style {
    match status {
        TaskStatus::NotStarted => Style::default().fg(TEXT_DIM),
        TaskStatus::InProgress => Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
        TaskStatus::Completed => Style::default().fg(NEON_GREEN),
    }
}

pub fn status_symbol(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "■",
        TaskStatus::InProgress => "▶",
        TaskStatus::Completed => "◉",
    }
}

pub fn error_style() -> Style {
    Style::default().fg(NEON_PINK)
}

pub fn syncing_style() -> Style {
    Style::default().fg(NEON_ORANGE)
}

// ── Progress bar ───────────────────────────────────────────────────

pub fn progress_bar(done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((done * width) / total).min(width)
    };
    let empty = width - filled;
    "█".repeat(filled) + &"░".repeat(empty)
}

/// A `width` x `height` rectangle centered in `area`, clamped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// ── ASCII art header ───────────────────────────────────────────────

pub const HEADER_ART: &str = "\
▐██▌ TASK MANAGER ▐██▌";

// ── Tests ──────────────────────────────────────────────────────────
