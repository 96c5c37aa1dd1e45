//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates the task
//! list, the add-task form and the confirmation dialog. Every mutation
//! writes the store back to disk before the next event is processed.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::fields::{FilterMode, Priority};
use crate::store::{
    filter_tasks, format_age, format_filter, format_priority, format_stats, Store,
};
use crate::tui::colors::{DARK_GREEN, DARK_RED, GOLD};
use crate::tui::enums::AppState;
use crate::tui::input::InputField;
use crate::tui::utils::centered_rect;

/// Badge color for a priority tag.
fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Low => DARK_GREEN,
        Priority::Medium => GOLD,
        Priority::High => DARK_RED,
    }
}

/// Main application state for the terminal user interface.
///
/// The store is the single source of truth; the visible id list and the
/// table selection are re-derived from it after every mutation.
pub struct App {
    state: AppState,
    store: Store,
    db_path: PathBuf,
    task_list_state: TableState,
    visible_tasks: Vec<u64>,
    filter: FilterMode,
    input: InputField,
    input_priority: Priority,
    grabbed: Option<u64>,
    status_message: String,
}

impl App {
    /// Create a new App instance, loading the store from the given path.
    pub fn new(db_path: &Path) -> Self {
        let store = Store::load(db_path);

        let mut app = App {
            state: AppState::TaskList,
            store,
            db_path: db_path.to_path_buf(),
            task_list_state: TableState::default(),
            visible_tasks: Vec::new(),
            filter: FilterMode::All,
            input: InputField::new(),
            input_priority: Priority::Medium,
            grabbed: None,
            status_message: String::new(),
        };

        app.update_visible_tasks();
        app
    }

    /// Re-derive the visible id list from the store and the active filter,
    /// preserving the selection when the selected task is still visible.
    fn update_visible_tasks(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.visible_tasks.get(idx))
            .copied();

        self.visible_tasks = filter_tasks(&self.store.tasks, self.filter)
            .iter()
            .map(|t| t.id)
            .collect();

        if let Some(old_id) = old_selected_id {
            if let Some(new_idx) = self.visible_tasks.iter().position(|&id| id == old_id) {
                self.task_list_state.select(Some(new_idx));
                return;
            }
        }
        self.task_list_state.select(if self.visible_tasks.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    /// Save the store to disk, reporting failures in the status bar.
    fn save_store(&mut self) {
        if let Err(e) = self.store.save(&self.db_path) {
            self.set_status_message(format!("Error saving: {e}"));
        }
    }

    /// Id of the task under the selection, if any.
    fn selected_task_id(&self) -> Option<u64> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible_tasks.get(idx))
            .copied()
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn select_next(&mut self) {
        if self.visible_tasks.is_empty() {
            return;
        }
        let next = match self.task_list_state.selected() {
            Some(i) if i + 1 < self.visible_tasks.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.task_list_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.visible_tasks.is_empty() {
            return;
        }
        let prev = match self.task_list_state.selected() {
            Some(i) if i > 0 => i - 1,
            Some(_) => 0,
            None => 0,
        };
        self.task_list_state.select(Some(prev));
    }

    /// Flip completion on the selected task and persist.
    fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if self.store.toggle(id) {
                self.save_store();
                self.update_visible_tasks();
            }
        }
    }

    /// Delete the selected task immediately and persist.
    fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if self.store.delete(id) {
                if self.grabbed == Some(id) {
                    self.grabbed = None;
                }
                self.save_store();
                self.update_visible_tasks();
                self.set_status_message("Task deleted".to_string());
            }
        }
    }

    /// First press grabs the selected task, second press drops it next to
    /// the selected target. Dropping on itself is a no-op.
    fn grab_or_drop(&mut self) {
        let Some(target) = self.selected_task_id() else {
            return;
        };
        match self.grabbed.take() {
            None => self.grabbed = Some(target),
            Some(from) if from == target => {}
            Some(from) => {
                if self.store.reorder(from, target) {
                    self.save_store();
                    self.update_visible_tasks();
                    if let Some(idx) = self.visible_tasks.iter().position(|&id| id == from) {
                        self.task_list_state.select(Some(idx));
                    }
                    self.set_status_message("Task moved".to_string());
                }
            }
        }
    }

    fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
        self.update_visible_tasks();
    }

    /// Ask for confirmation before clearing, unless there is nothing to
    /// clear.
    fn request_clear(&mut self) {
        if self.store.tasks.is_empty() {
            self.set_status_message("No tasks to clear".to_string());
        } else {
            self.state = AppState::Confirm;
        }
    }

    fn handle_task_list_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.grabbed.take().is_none() {
                    return true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('a') => {
                self.input.clear();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('m') => self.grab_or_drop(),
            KeyCode::Char('1') => self.set_filter(FilterMode::All),
            KeyCode::Char('2') => self.set_filter(FilterMode::Completed),
            KeyCode::Char('3') => self.set_filter(FilterMode::Pending),
            KeyCode::Tab => self.set_filter(self.filter.next()),
            KeyCode::Char('c') => self.request_clear(),
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_add_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.input.clear();
                self.state = AppState::TaskList;
            }
            KeyCode::Tab => self.input_priority = self.input_priority.next(),
            KeyCode::Enter => {
                if self.store.create(&self.input.value, self.input_priority).is_ok() {
                    self.save_store();
                    self.input.clear();
                    self.update_visible_tasks();
                    self.set_status_message("Task added".to_string());
                }
                // Empty text keeps the form open with the input focused.
            }
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') => {
                self.store.clear();
                self.save_store();
                self.update_visible_tasks();
                self.set_status_message("Cleared all tasks".to_string());
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Esc => self.state = AppState::TaskList,
            _ => {}
        }
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.clear_status_message();

                let should_quit = match self.state {
                    AppState::TaskList => self.handle_task_list_input(key.code),
                    AppState::AddTask => {
                        self.handle_add_input(key.code);
                        false
                    }
                    AppState::Confirm => {
                        self.handle_confirm_input(key.code);
                        false
                    }
                    AppState::Help => {
                        self.state = AppState::TaskList;
                        false
                    }
                };
                if should_quit {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Render the header, the filter tabs and the task table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // header
                Constraint::Length(1), // filter tabs
                Constraint::Min(0),    // table
            ])
            .split(area);

        let (total, completed) = format_stats(&self.store.tasks);
        let header_text = vec![Line::from(vec![
            Span::styled("TASK LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{total} | {completed}"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        let mut tabs: Vec<Span> = Vec::new();
        for (i, mode) in [FilterMode::All, FilterMode::Completed, FilterMode::Pending]
            .iter()
            .enumerate()
        {
            let style = if *mode == self.filter {
                Style::default()
                    .bg(Color::Gray)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            tabs.push(Span::styled(
                format!(" [{}] {} ", i + 1, format_filter(*mode)),
                style,
            ));
            tabs.push(Span::raw(" "));
        }
        f.render_widget(Paragraph::new(Line::from(tabs)), chunks[1]);

        let title = format!(
            "Tasks ({}/{})",
            self.visible_tasks.len(),
            self.store.tasks.len()
        );

        if self.visible_tasks.is_empty() {
            let placeholder = Paragraph::new("No tasks found")
                .block(Block::default().borders(Borders::ALL).title(title))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(placeholder, chunks[2]);
            return;
        }

        let header_cells = ["", "Pri", "Age", "Text"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let now = Utc::now().timestamp();
        let rows: Vec<Row> = self
            .visible_tasks
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|task| {
                let mark = if task.completed { "[x]" } else { "[ ]" };
                let base = if task.completed {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                let priority_style = if task.completed {
                    base
                } else {
                    Style::default().fg(priority_color(task.priority))
                };
                let style = if self.grabbed == Some(task.id) {
                    base.add_modifier(Modifier::REVERSED)
                } else {
                    base
                };

                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(format_priority(task.priority)).style(priority_style),
                    Cell::from(format_age(task.created_at_utc, now)),
                    Cell::from(task.text.as_str()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),  // mark
            Constraint::Length(8),  // priority
            Constraint::Length(12), // age
            Constraint::Min(20),    // text
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[2], &mut self.task_list_state);
    }

    /// Render the add-task popup with the text input and priority selector.
    fn render_add_form(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 40, area);
        f.render_widget(Clear, area);

        let block = Block::default().title("Add Task").borders(Borders::ALL);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        let input_block = Block::default().borders(Borders::ALL).title("Text");
        let input_inner = input_block.inner(chunks[0]);
        let input = Paragraph::new(self.input.value.as_str()).block(input_block);
        f.render_widget(input, chunks[0]);
        f.set_cursor_position((
            input_inner.x + self.input.cursor_column() as u16,
            input_inner.y,
        ));

        let priority_line = Line::from(vec![
            Span::raw("Priority: "),
            Span::styled(
                format!("< {} >", format_priority(self.input_priority)),
                Style::default()
                    .fg(priority_color(self.input_priority))
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        f.render_widget(Paragraph::new(priority_line), chunks[1]);

        let instructions = Paragraph::new("Enter to add  Tab to change priority  Esc to cancel")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(instructions, chunks[2]);
    }

    /// Render the confirmation dialog for clearing the whole list.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let (total, _) = format_stats(&self.store.tasks);
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(format!("Clear {total}")),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(Span::styled(
                "Keys",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Up/Down, k/j   select task"),
            Line::from("Space          toggle completion"),
            Line::from("a              add a task"),
            Line::from("d              delete the selected task"),
            Line::from("m              grab the selected task, m again on the target row drops it"),
            Line::from("1 / 2 / 3      show all / completed / pending"),
            Line::from("Tab            cycle the filter"),
            Line::from("c              clear all tasks"),
            Line::from("q, Esc         quit"),
            Line::from(""),
            Line::from("Press any key to return."),
        ];
        let help = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });
        f.render_widget(help, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(id) = self.grabbed {
            let text = self.store.get(id).map(|t| t.text.as_str()).unwrap_or("?");
            format!("Moving \"{text}\" - press m on the target row, Esc cancels")
        } else {
            match self.state {
                AppState::TaskList => {
                    let (total, completed) = format_stats(&self.store.tasks);
                    format!(
                        "{total} | {completed} | a add  Space toggle  d delete  m move  c clear  h help"
                    )
                }
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(Color::Blue).fg(Color::White))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the appropriate view.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::AddTask => {
                self.render_task_list(f, chunks[0]);
                self.render_add_form(f, chunks[0]);
            }
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
