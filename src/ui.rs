use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use expense_classifier::{submit, Category, LedgerStore, Model, Report, Submission};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Messages,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Name => Focus::Messages,
            Focus::Messages => Focus::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

impl Status {
    fn color(&self) -> Color {
        match self {
            Status::Info(_) => Color::Cyan,
            Status::Warning(_) => Color::Yellow,
            Status::Error(_) => Color::Red,
        }
    }

    fn text(&self) -> String {
        match self {
            Status::Info(msg) => format!("ℹ️  {}", msg),
            Status::Warning(msg) => format!("⚠️  {}", msg),
            Status::Error(msg) => format!("❌ {}", msg),
        }
    }
}

pub struct App<'a> {
    model: &'a Model,
    store: &'a dyn LedgerStore,
    pub name: String,
    pub messages: String,
    pub focus: Focus,
    pub status: Status,
    pub report: Option<Report>,
    pub state: TableState,
}

impl<'a> App<'a> {
    pub fn new(model: &'a Model, store: &'a dyn LedgerStore) -> Self {
        Self {
            model,
            store,
            name: String::new(),
            messages: String::new(),
            focus: Focus::Name,
            status: Status::Info("Please enter your name to begin.".to_string()),
            report: None,
            state: TableState::default(),
        }
    }

    fn field(&mut self) -> &mut String {
        match self.focus {
            Focus::Name => &mut self.name,
            Focus::Messages => &mut self.messages,
        }
    }

    pub fn input(&mut self, c: char) {
        self.field().push(c);
    }

    pub fn paste(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        match self.focus {
            // The name is a single line
            Focus::Name => self.name.push_str(text.lines().next().unwrap_or("")),
            Focus::Messages => self.messages.push_str(&text),
        }
    }

    pub fn backspace(&mut self) {
        self.field().pop();
    }

    pub fn enter(&mut self) {
        match self.focus {
            Focus::Name => self.focus = Focus::Messages,
            Focus::Messages => self.messages.push('\n'),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Classify the message box for the current name and show the result
    pub fn submit(&mut self) {
        match submit(self.model, self.store, &self.name, &self.messages) {
            Ok(Submission::Rejected(warning)) => {
                self.status = Status::Warning(warning.to_string());
            }
            Ok(Submission::Accepted(report)) => {
                self.status = Status::Info(format!(
                    "Classified {} message(s) for {} ({} total)",
                    report.added,
                    report.key,
                    report.entries.len()
                ));
                self.messages.clear();
                self.state
                    .select(report.entries.len().checked_sub(1));
                self.report = Some(report);
            }
            Err(e) => {
                self.status = Status::Error(format!("{:#}", e));
            }
        }
    }

    fn row_count(&self) -> usize {
        self.report.as_ref().map(|r| r.entries.len()).unwrap_or(0)
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Returns false when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Char('s') if ctrl => self.submit(),
            KeyCode::F(5) => self.submit(),
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::Enter => self.enter(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::Char(c) if !ctrl => self.input(c),
            _ => {}
        }
        true
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if !app.handle_key(key) {
                    return Ok(());
                }
            }
            Event::Paste(text) => app.paste(&text),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Name
            Constraint::Length(8), // Messages
            Constraint::Length(3), // Status
            Constraint::Min(0),    // Results
            Constraint::Length(3), // Key help
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_input(
        f,
        chunks[1],
        " 👤 Your name ",
        &app.name,
        app.focus == Focus::Name,
    );
    render_input(
        f,
        chunks[2],
        " 📩 Messages (one per line) ",
        &app.messages,
        app.focus == Focus::Messages,
    );
    render_status(f, chunks[3], &app.status);

    let results = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[4]);

    render_table(f, results[0], app);
    render_chart(f, results[1], app);
    render_help(f, chunks[5]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![Span::styled(
        "💳 Personal Finance Expense Classifier",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_input(f: &mut Frame, area: Rect, title: &str, text: &str, focused: bool) {
    let border = if focused { Color::Yellow } else { Color::White };

    let mut lines: Vec<Line> = text.split('\n').map(|l| Line::from(l.to_string())).collect();
    if focused {
        if let Some(last) = lines.last_mut() {
            last.spans
                .push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
    }

    // Keep the last line visible
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let input = Paragraph::new(lines).scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title.to_string()),
    );

    f.render_widget(input, area);
}

fn render_status(f: &mut Frame, area: Rect, status: &Status) {
    let paragraph = Paragraph::new(Span::styled(
        status.text(),
        Style::default().fg(status.color()),
    ))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Food => Color::LightRed,
        Category::Bills => Color::Yellow,
        Category::Shopping => Color::Magenta,
        Category::Travel => Color::Cyan,
        Category::Rent => Color::Blue,
        Category::Income => Color::Green,
        Category::Entertainment => Color::LightMagenta,
        Category::Others => Color::Gray,
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["User", "Message", "Category"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let entries = app
        .report
        .as_ref()
        .map(|r| r.entries.as_slice())
        .unwrap_or(&[]);

    let rows = entries.iter().map(|entry| {
        let cells = vec![
            Cell::from(truncate(&entry.user, 16)),
            Cell::from(entry.message.clone()),
            Cell::from(entry.category.as_str())
                .style(Style::default().fg(category_color(entry.category))),
        ];
        Row::new(cells).height(1)
    });

    let title = match &app.report {
        Some(report) => format!(" 📄 Categorized Transactions - {} ", report.key),
        None => " 📄 Categorized Transactions ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" 📊 Expense Breakdown by Category ");

    let data: Vec<(&str, u64)> = app
        .report
        .as_ref()
        .map(|r| {
            r.frequencies
                .iter()
                .map(|c| (c.category.as_str(), c.count as u64))
                .collect()
        })
        .unwrap_or_default();

    if data.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "  No transactions yet",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(data.as_slice())
        .bar_width(1)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .label_style(Style::default().fg(Color::White));

    f.render_widget(chart, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let spans = vec![
        Span::styled(" Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Switch field | "),
        Span::styled("Ctrl+S/F5", Style::default().fg(Color::Yellow)),
        Span::raw(" Analyze | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Rows | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let help = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(help, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
