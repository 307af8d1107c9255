use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Field, Focus};
use crate::domain::task::{Status, Task, TaskDraft};

pub fn run(mut app: App, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let res = loop {
        app.poll_responses();
        if let Err(e) = terminal.draw(|f| draw(f, &app)) {
            break Err(e.into());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        match poll_key(timeout) {
            Ok(Some(code)) => {
                if handle_key(&mut app, code) {
                    break Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => break Err(e),
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    };

    cleanup_terminal(&mut terminal)?;
    res
}

fn poll_key(timeout: Duration) -> Result<Option<KeyCode>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Returns true when the user asked to quit.
fn handle_key(app: &mut App, code: KeyCode) -> bool {
    match app.focus {
        Focus::List => match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => app.select_next(),
            KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
            KeyCode::Char('a') | KeyCode::Char('n') => app.focus_draft(),
            KeyCode::Char('e') | KeyCode::Enter => app.start_edit_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('r') => {
                app.refresh();
                app.set_status("Reloading");
            }
            _ => {}
        },
        Focus::Draft(_) | Focus::Edit(_) => match code {
            KeyCode::Esc => app.leave_form(),
            KeyCode::Enter => {
                if matches!(app.focus, Focus::Draft(_)) {
                    app.add_task();
                } else {
                    app.save_edit();
                }
            }
            KeyCode::Tab => app.next_field(),
            KeyCode::BackTab => app.previous_field(),
            KeyCode::Left => app.cycle_status(false),
            KeyCode::Right => app.cycle_status(true),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.input_char(c),
            _ => {}
        },
    }
    false
}

fn draw(f: &mut ratatui::Frame, app: &App) {
    let size = f.area();
    let error_height = if app.board.error.is_empty() { 0 } else { 3 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(error_height),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    f.render_widget(render_header(app), chunks[0]);
    if !app.board.error.is_empty() {
        f.render_widget(render_error(&app.board.error), chunks[1]);
    }
    f.render_widget(render_draft(app), chunks[2]);

    let mut list_state = ListState::default();
    if !app.board.tasks.is_empty() {
        list_state.select(Some(app.selected));
    }
    f.render_stateful_widget(render_list(app), chunks[3], &mut list_state);

    f.render_widget(render_footer(app), chunks[4]);
}

fn render_header(app: &App) -> Paragraph<'static> {
    let total = app.board.tasks.len();
    let done = app
        .board
        .tasks
        .iter()
        .filter(|t| t.status == Status::Completed)
        .count();
    let summary = format!("Open: {} / All: {}", total.saturating_sub(done), total);
    let mut spans = vec![
        Span::styled("TODO Application", Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(summary, Style::default().fg(Color::Yellow)),
    ];
    if app.is_busy() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            "⏳ Talking to server...",
            Style::default().fg(Color::Magenta),
        ));
    }
    Paragraph::new(Line::from(spans))
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn render_error(error: &str) -> Paragraph<'_> {
    Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Error").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn render_draft(app: &App) -> Paragraph<'_> {
    let focused = match app.focus {
        Focus::Draft(field) => Some(field),
        _ => None,
    };
    let mut spans = form_spans(&app.board.draft, focused);
    spans.push(Span::raw("  [Add Task]"));
    let title = if focused.is_some() {
        "New task (Tab next field ; ←/→ status ; Enter add ; Esc back)"
    } else {
        "New task (a to edit)"
    };
    Paragraph::new(Line::from(spans)).block(Block::default().title(title).borders(Borders::ALL))
}

/// Editable fields of a draft or edit row, highlighting the focused one.
fn form_spans(draft: &TaskDraft, focused: Option<Field>) -> Vec<Span<'static>> {
    let field_style = |field: Field| {
        if focused == Some(field) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        }
    };
    let cursor = |field: Field| if focused == Some(field) { "█" } else { "" };
    vec![
        Span::raw("Name: "),
        Span::styled(
            format!("[{}{}]", draft.name, cursor(Field::Name)),
            field_style(Field::Name),
        ),
        Span::raw("  Priority: "),
        Span::styled(
            format!("[{}{}]", draft.priority, cursor(Field::Priority)),
            field_style(Field::Priority),
        ),
        Span::raw("  Status: "),
        Span::styled(
            format!("< {} >", draft.status),
            field_style(Field::Status),
        ),
    ]
}

/// One list row in view mode. Delete is only offered for completed tasks.
fn task_line(task: &Task) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!(
            "{} - Priority: {} - Status: {}",
            task.name, task.priority, task.status
        )),
        Span::styled("  [e] Edit", Style::default().fg(Color::Blue)),
    ];
    if task.is_deletable() {
        spans.push(Span::styled("  [d] Delete", Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn edit_line(draft: &TaskDraft, focused: Option<Field>) -> Line<'static> {
    let mut spans = form_spans(draft, focused);
    spans.push(Span::styled(
        "  [Enter] Save  [Esc] Cancel",
        Style::default().fg(Color::Green),
    ));
    Line::from(spans)
}

fn render_list(app: &App) -> List<'static> {
    let edit_focus = match app.focus {
        Focus::Edit(field) => Some(field),
        _ => None,
    };
    let items: Vec<ListItem> = app
        .board
        .tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let line = match app.board.editing.as_ref() {
                Some(edit) if edit.id == task.id => edit_line(&edit.draft, edit_focus),
                _ => task_line(task),
            };
            let style = if app.board.is_editing(task.id) {
                Style::default().fg(Color::Yellow)
            } else if idx == app.selected && app.focus == Focus::List {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if task.status == Status::Completed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    List::new(items)
        .block(Block::default().title("Task List").borders(Borders::ALL))
        .highlight_symbol("➤ ")
}

fn render_footer(app: &App) -> Paragraph<'_> {
    let (title, default_hint) = match app.focus {
        Focus::List => (
            "Normal",
            "q quit ; j/k move ; a add ; e edit ; d delete ; r reload",
        ),
        Focus::Draft(_) => ("New task", "Enter add ; Esc back"),
        Focus::Edit(_) => ("Edit", "Enter save ; Esc cancel"),
    };
    let msg = app.status.as_deref().unwrap_or(default_hint);
    Paragraph::new(msg).block(Block::default().title(title).borders(Borders::ALL))
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
