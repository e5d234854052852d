use anyhow::Result;
use contact_dedup::{
    group_by_initial, run_and_report, ContactRecord, ContactSource, OperationReport,
};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

/// One line of the contact list: a letter heading or a contact
#[derive(Debug, Clone, PartialEq)]
pub enum ListRow {
    Heading(char),
    Contact(ContactRecord),
}

pub struct App<S: ContactSource> {
    pub source: S,
    pub rows: Vec<ListRow>,
    pub contact_count: usize,
    pub state: TableState,
    pub status: Option<OperationReport>,
    pub load_error: Option<String>,
}

impl<S: ContactSource> App<S> {
    pub fn new(source: S) -> Self {
        let mut app = Self {
            source,
            rows: Vec::new(),
            contact_count: 0,
            state: TableState::default(),
            status: None,
            load_error: None,
        };
        app.reload();
        app
    }

    /// Re-read every contact from the source and rebuild the grouped rows
    pub fn reload(&mut self) {
        match self.source.list_all() {
            Ok(contacts) => {
                self.rows = build_rows(&contacts);
                self.contact_count = contacts.len();
                self.load_error = None;
            }
            Err(e) => {
                self.rows.clear();
                self.contact_count = 0;
                self.load_error = Some(e.to_string());
            }
        }

        let selected = self.state.selected().unwrap_or(0);
        if self.rows.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(selected.min(self.rows.len() - 1)));
        }
    }

    /// Remove duplicates; the list is refreshed only when something was deleted
    pub fn delete_duplicates(&mut self) {
        let report = run_and_report(&mut self.source);
        if report.is_success() {
            self.reload();
        }
        self.status = Some(report);
    }

    pub fn selected_contact(&self) -> Option<&ContactRecord> {
        match self.state.selected().and_then(|i| self.rows.get(i)) {
            Some(ListRow::Contact(c)) => Some(c),
            _ => None,
        }
    }

    pub fn next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

/// Flatten grouped contacts into heading + contact rows
pub fn build_rows(contacts: &[ContactRecord]) -> Vec<ListRow> {
    let mut rows = Vec::new();
    for (letter, members) in group_by_initial(contacts) {
        rows.push(ListRow::Heading(letter));
        rows.extend(members.into_iter().cloned().map(ListRow::Contact));
    }
    rows
}

pub fn run_ui<S: ContactSource>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: ContactSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('d') => app.delete_duplicates(),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => {
                    if !app.rows.is_empty() {
                        app.state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    if !app.rows.is_empty() {
                        app.state.select(Some(app.rows.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui<S: ContactSource>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header / operation status
            Constraint::Min(0),    // Contact list
            Constraint::Length(3), // Key help
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_status_bar(f, chunks[2]);
}

fn render_header<S: ContactSource>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut spans = vec![
        Span::styled(
            "Contacts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total: {}", app.contact_count),
            Style::default().fg(Color::White),
        ),
    ];

    if let Some(contact) = app.selected_contact() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("#{} {}", contact.id, contact.phone_number),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(err) = &app.load_error {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(err.clone(), Style::default().fg(Color::Red)));
    } else if let Some(report) = &app.status {
        let color = match report.status {
            0 => Color::Green,
            1 => Color::Cyan,
            _ => Color::Red,
        };
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(report.message.clone(), Style::default().fg(color)));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table<S: ContactSource>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let rows = app.rows.iter().map(|row| match row {
        ListRow::Heading(letter) => Row::new(vec![Cell::from(letter.to_string()).style(
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )]),
        ListRow::Contact(c) => {
            let name = if c.display_name.is_empty() {
                "(no name)".to_string()
            } else {
                truncate(&c.display_name, 30)
            };
            Row::new(vec![
                Cell::from(""),
                Cell::from(name),
                Cell::from(c.phone_number.clone()),
                Cell::from(c.phone_type.clone().unwrap_or_default())
                    .style(Style::default().fg(Color::DarkGray)),
            ])
        }
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(32),
            Constraint::Length(22),
            Constraint::Length(12),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Contacts "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let status_spans = vec![
        Span::styled(" d", Style::default().fg(Color::Yellow)),
        Span::raw(" Delete duplicates | "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
