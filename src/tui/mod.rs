mod app;
mod theme;
mod ui;

pub use app::App;

use std::io::stdout;
use std::panic;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;

use crate::client::TaskClient;

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen);
}

/// Leaves the alternate screen however the task screen exits.
struct ScreenGuard;

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Blocks the calling thread until the user quits. Requests to the proxy are
/// spawned on `runtime`, so this must not run on one of its worker threads.
pub fn run(client: TaskClient, runtime: Handle) -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let _screen = ScreenGuard;

    // A panic message printed inside the alternate screen is lost.
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous_hook(info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    tracing::info!(url = client.url(), "task screen starting");
    let result = App::new(client, runtime).run(&mut terminal);
    tracing::info!(ok = result.is_ok(), "task screen closed");

    // Unregister the restoring hook.
    let _ = panic::take_hook();
    result
}
