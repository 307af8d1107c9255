use crate::domain::task::{TaskDraft, TaskId};
use crate::usecase::board::{Request, TaskBoard};
use crate::usecase::dispatch::Dispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Priority,
    Status,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Name => Field::Priority,
            Field::Priority => Field::Status,
            Field::Status => Field::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Name => Field::Status,
            Field::Priority => Field::Name,
            Field::Status => Field::Priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Draft(Field),
    Edit(Field),
}

pub struct App {
    pub board: TaskBoard,
    dispatcher: Dispatcher,
    pub selected: usize,
    pub focus: Focus,
    pub status: Option<String>,
}

impl App {
    /// Builds the app and issues the initial fetch.
    pub fn new(dispatcher: Dispatcher) -> Self {
        let mut app = Self {
            board: TaskBoard::default(),
            dispatcher,
            selected: 0,
            focus: Focus::List,
            status: None,
        };
        app.refresh();
        app
    }

    /// Apply every finished request and send whatever follow-ups they ask for.
    pub fn poll_responses(&mut self) {
        while let Some(completion) = self.dispatcher.try_next() {
            if let Some(next) = self.board.apply(completion) {
                self.dispatcher.dispatch(next);
            }
        }
        if matches!(self.focus, Focus::Edit(_)) && self.board.editing.is_none() {
            self.focus = Focus::List;
        }
        if self.selected >= self.board.tasks.len() {
            self.selected = self.board.tasks.len().saturating_sub(1);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.dispatcher.in_flight() > 0
    }

    fn send(&mut self, request: Request) {
        self.dispatcher.dispatch(request);
    }

    pub fn refresh(&mut self) {
        let request = self.board.fetch_tasks();
        self.send(request);
    }

    pub fn select_next(&mut self) {
        if !self.board.tasks.is_empty() {
            self.selected = (self.selected + 1).min(self.board.tasks.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.board.tasks.get(self.selected).map(|t| t.id)
    }

    pub fn focus_draft(&mut self) {
        self.focus = Focus::Draft(Field::Name);
        self.set_status("Fill in the new task and press Enter");
    }

    pub fn add_task(&mut self) {
        let request = self.board.add_task();
        self.send(request);
        self.set_status("Adding task...");
    }

    pub fn start_edit_selected(&mut self) {
        let Some(task) = self.board.tasks.get(self.selected).cloned() else {
            return;
        };
        self.board.start_edit(&task);
        self.focus = Focus::Edit(Field::Name);
        self.set_status("Editing (Enter to save / Esc to cancel)");
    }

    pub fn save_edit(&mut self) {
        if let Some(request) = self.board.save_edit() {
            self.send(request);
            self.set_status("Saving...");
        }
    }

    pub fn cancel_edit(&mut self) {
        self.board.cancel_edit();
        self.focus = Focus::List;
        self.set_status("Canceled");
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.board.delete_task(id) {
            Some(request) => {
                self.send(request);
                self.set_status("Deleting...");
            }
            None => self.set_status("Only completed tasks can be deleted"),
        }
    }

    pub fn leave_form(&mut self) {
        match self.focus {
            Focus::Edit(_) => self.cancel_edit(),
            Focus::Draft(_) => {
                self.focus = Focus::List;
                self.status = None;
            }
            Focus::List => {}
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            Focus::Draft(field) => Focus::Draft(field.next()),
            Focus::Edit(field) => Focus::Edit(field.next()),
            Focus::List => Focus::List,
        };
    }

    pub fn previous_field(&mut self) {
        self.focus = match self.focus {
            Focus::Draft(field) => Focus::Draft(field.previous()),
            Focus::Edit(field) => Focus::Edit(field.previous()),
            Focus::List => Focus::List,
        };
    }

    /// Draft or edit row the focused field belongs to.
    fn focused_form(&mut self) -> Option<(&mut TaskDraft, Field)> {
        match self.focus {
            Focus::Draft(field) => Some((&mut self.board.draft, field)),
            Focus::Edit(field) => self
                .board
                .editing
                .as_mut()
                .map(|edit| (&mut edit.draft, field)),
            Focus::List => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        let Some((form, field)) = self.focused_form() else {
            return;
        };
        match field {
            Field::Name => form.name.push(c),
            Field::Priority => form.priority.push(c),
            Field::Status if c == ' ' => form.status = form.status.next(),
            Field::Status => {}
        }
    }

    pub fn backspace(&mut self) {
        let Some((form, field)) = self.focused_form() else {
            return;
        };
        match field {
            Field::Name => {
                form.name.pop();
            }
            Field::Priority => {
                form.priority.pop();
            }
            Field::Status => {}
        }
    }

    pub fn cycle_status(&mut self, forward: bool) {
        let Some((form, Field::Status)) = self.focused_form() else {
            return;
        };
        form.status = if forward {
            form.status.next()
        } else {
            form.status.previous()
        };
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(msg.to_string());
    }
}
