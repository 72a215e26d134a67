use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::client::TaskClient;
use crate::models::{DraftError, Task, TaskStatus};
use crate::store::{self, Action, Effect, TaskStore};
use crate::tui::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    StatusPicker,
    HelpOverlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    DueDate,
}

pub struct App {
    pub store: TaskStore,
    pub running: bool,
    pub mode: InputMode,
    pub form_field: FormField,
    pub form_error: Option<DraftError>,
    pub selected_task_idx: usize,
    pub picker_idx: usize,
    /// Task the open status picker applies to; survives reloads that reorder the list.
    pub picker_task_id: Option<String>,
    /// Effects spawned whose outcome has not come back yet.
    pub in_flight: usize,
    client: TaskClient,
    runtime: Handle,
    outcome_tx: UnboundedSender<Action>,
    outcome_rx: UnboundedReceiver<Action>,
}

/// Wraps an index by `delta` within `len`, returning `None` when the list is empty.
fn wrap_index(current: usize, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(((current as isize + delta).rem_euclid(len as isize)) as usize)
}

impl App {
    pub fn new(client: TaskClient, runtime: Handle) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        Self {
            store: TaskStore::new(),
            running: true,
            mode: InputMode::Normal,
            form_field: FormField::Title,
            form_error: None,
            selected_task_idx: 0,
            picker_idx: 0,
            picker_task_id: None,
            in_flight: 0,
            client,
            runtime,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        self.dispatch(Action::LoadRequested);

        while self.running {
            terminal.draw(|frame| ui::draw(frame, self))?;

            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key);
            }

            self.drain_outcomes();
        }
        Ok(())
    }

    /// Feeds an action to the store and starts whatever effect it asks for.
    pub fn dispatch(&mut self, action: Action) {
        if let Some(effect) = self.store.dispatch(action) {
            self.spawn_effect(effect);
        }
        self.selected_task_idx = self
            .selected_task_idx
            .min(self.store.tasks.len().saturating_sub(1));
    }

    fn spawn_effect(&mut self, effect: Effect) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let outcome = store::execute(&client, effect).await;
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(outcome);
        });
    }

    /// Applies every effect outcome that arrived since the last tick.
    pub fn drain_outcomes(&mut self) {
        while let Ok(action) = self.outcome_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(action);
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.store.tasks.get(self.selected_task_idx)
    }

    pub fn picked_status(&self) -> TaskStatus {
        TaskStatus::ALL[self.picker_idx % TaskStatus::ALL.len()]
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Form => self.handle_form_key(key),
            InputMode::StatusPicker => self.handle_picker_key(key),
            InputMode::HelpOverlay => self.handle_help_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.mode = InputMode::HelpOverlay,
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.form_field = FormField::Title;
                self.mode = InputMode::Form;
            }
            KeyCode::Char('r') => self.dispatch(Action::LoadRequested),
            KeyCode::Char('j') | KeyCode::Down => self.navigate(1),
            KeyCode::Char('k') | KeyCode::Up => self.navigate(-1),
            KeyCode::Char('s') | KeyCode::Enter => self.open_status_picker(),
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::BackTab => {
                self.form_field = match self.form_field {
                    FormField::Title => FormField::DueDate,
                    FormField::DueDate => FormField::Title,
                };
            }
            KeyCode::Enter => self.submit_draft(),
            KeyCode::Backspace => {
                self.active_field_mut().pop();
                self.form_error = None;
            }
            KeyCode::Char(c) => {
                self.active_field_mut().push(c);
                self.form_error = None;
            }
            _ => {}
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.form_field {
            FormField::Title => &mut self.store.draft.title,
            FormField::DueDate => &mut self.store.draft.due_date,
        }
    }

    /// Invalid drafts stay in the form with an inline error and never reach
    /// the service.
    fn submit_draft(&mut self) {
        match self.store.draft.validate() {
            Ok(new_task) => {
                self.form_error = None;
                self.mode = InputMode::Normal;
                self.dispatch(Action::CreateRequested(new_task));
            }
            Err(e) => {
                self.form_field = match e {
                    DraftError::MissingTitle => FormField::Title,
                    DraftError::MissingDueDate | DraftError::InvalidDueDate(_) => {
                        FormField::DueDate
                    }
                };
                self.form_error = Some(e);
            }
        }
    }

    fn navigate(&mut self, delta: isize) {
        if let Some(next) = wrap_index(self.selected_task_idx, self.store.tasks.len(), delta) {
            self.selected_task_idx = next;
        }
    }

    fn open_status_picker(&mut self) {
        let Some((task_id, current)) = self.selected_task().map(|t| (t.id.clone(), t.status)) else {
            return;
        };
        self.picker_idx = current.index();
        self.picker_task_id = Some(task_id);
        self.mode = InputMode::StatusPicker;
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let len = TaskStatus::ALL.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.picker_idx = (self.picker_idx + 1) % len;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.picker_idx = (self.picker_idx + len - 1) % len;
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.picker_idx = c as usize - '1' as usize;
                self.confirm_status();
            }
            KeyCode::Enter => self.confirm_status(),
            KeyCode::Esc | KeyCode::Char('q') => {
                self.picker_task_id = None;
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    /// Picking the status a task already has is not a change.
    fn confirm_status(&mut self) {
        self.mode = InputMode::Normal;
        let status = self.picked_status();
        let Some(task_id) = self.picker_task_id.take() else {
            return;
        };
        // The task may have left the list while the picker was open.
        let Some(task) = self.store.tasks.iter().find(|t| t.id == task_id) else {
            return;
        };
        if task.status == status {
            return;
        }
        self.dispatch(Action::StatusUpdateRequested { task_id, status });
    }
}
