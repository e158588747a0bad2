use std::time::Duration;
use std::{error::Error, io};

use loans::aggregate::{self, GradeTotal};
use loans::filter::{self, Constraints, Field};
use loans::{LoadState, Loader, Record};

use crate::data::GradeRow;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Layout, Rect},
    style::{self, Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use style::palette::tailwind;
use unicode_width::UnicodeWidthStr;

const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];
const INFO_TEXT: &str =
    "(Esc) quit | (Tab) next filter | (↑/↓) change value | (r) reset filters | (→/←) color";

/// How long one event-poll tick waits; the loader is polled between ticks
/// so the Loading screen stays live without user input.
const TICK: Duration = Duration::from_millis(100);

struct TableColors {
    buffer_bg: Color,
    header_bg: Color,
    header_fg: Color,
    row_fg: Color,
    selected_style_fg: Color,
    normal_row_color: Color,
    footer_border_color: Color,
}

impl TableColors {
    const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            header_fg: tailwind::SLATE.c200,
            row_fg: tailwind::SLATE.c200,
            selected_style_fg: color.c400,
            normal_row_color: tailwind::SLATE.c950,
            footer_border_color: color.c400,
        }
    }
}

struct App {
    loader: Loader,
    filters: Constraints,
    focus: usize,
    colors: TableColors,
    color_index: usize,
}

impl App {
    fn new(loader: Loader) -> Self {
        Self {
            loader,
            filters: Constraints::default(),
            focus: 0,
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
        }
    }

    fn records(&self) -> &[Record] {
        self.loader.data().unwrap_or(&[])
    }

    fn totals(&self) -> Vec<GradeTotal> {
        // recomputed from the raw record set on every draw
        aggregate::balance_by_grade(&filter::filter(self.records(), &self.filters))
    }

    fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Field::ALL.len();
    }

    fn previous_field(&mut self) {
        let count = Field::ALL.len();
        self.focus = (self.focus + count - 1) % count;
    }

    /// Cycle the focused filter forward: All -> first option -> ... ->
    /// last option -> All.
    fn next_value(&mut self) {
        let field = self.focused_field();
        let options = filter::options_for(self.records(), field);
        if options.is_empty() {
            return;
        }
        let next = match self.filters.get(field) {
            None => Some(options[0].clone()),
            Some(current) => match options.iter().position(|option| option == current) {
                Some(i) if i + 1 < options.len() => Some(options[i + 1].clone()),
                _ => None,
            },
        };
        self.filters.set(field, next);
    }

    fn previous_value(&mut self) {
        let field = self.focused_field();
        let options = filter::options_for(self.records(), field);
        if options.is_empty() {
            return;
        }
        let previous = match self.filters.get(field) {
            None => options.last().cloned(),
            Some(current) => match options.iter().position(|option| option == current) {
                Some(i) if i > 0 => Some(options[i - 1].clone()),
                _ => None,
            },
        };
        self.filters.set(field, previous);
    }

    fn reset_filters(&mut self) {
        self.filters.reset();
    }

    fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
    }

    fn previous_color(&mut self) {
        let count = PALETTES.len();
        self.color_index = (self.color_index + count - 1) % count;
    }

    fn set_colors(&mut self) {
        self.colors = TableColors::new(&PALETTES[self.color_index]);
    }
}

pub fn run(loader: Loader) -> Result<(), Box<dyn Error>> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let mut app = App::new(loader);
    app.loader.start();
    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        app.loader.poll();
        terminal.draw(|f| ui(f, &mut app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Tab => app.next_field(),
                    KeyCode::BackTab => app.previous_field(),
                    KeyCode::Char('j') | KeyCode::Down => app.next_value(),
                    KeyCode::Char('k') | KeyCode::Up => app.previous_value(),
                    KeyCode::Char('r') => app.reset_filters(),
                    KeyCode::Char('l') | KeyCode::Right => app.next_color(),
                    KeyCode::Char('h') | KeyCode::Left => app.previous_color(),
                    _ => {}
                }
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    app.set_colors();

    match app.loader.state() {
        LoadState::Idle | LoadState::Loading => render_message(f, app, "Loading..."),
        LoadState::Failed(_) => render_message(f, app, "Something went wrong"),
        LoadState::Loaded(records) if records.is_empty() => render_message(f, app, "No data"),
        LoadState::Loaded(_) => render_dashboard(f, app),
    }
}

fn render_dashboard(f: &mut Frame, app: &App) {
    let rects = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Min(8),
        Constraint::Length(3),
    ])
    .split(f.size());

    render_filters(f, app, rects[0]);

    let totals = app.totals();
    if totals.is_empty() {
        // everything filtered away; keep the filter boxes interactive
        let no_data = Paragraph::new("No data")
            .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
            .centered();
        f.render_widget(no_data, rects[1]);
        f.render_widget(
            Paragraph::new("").style(Style::new().bg(app.colors.buffer_bg)),
            rects[2],
        );
    } else {
        let rows = GradeRow::from_totals(&totals);
        render_grade_table(f, app, &rows, rects[1]);
        render_chart(f, app, &totals, rects[2]);
    }

    render_footer(f, app, rects[3]);
}

fn render_message(f: &mut Frame, app: &App, text: &str) {
    let rects = Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).split(f.size());
    let message = Paragraph::new(text.to_string())
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(message, rects[0]);
    render_footer(f, app, rects[1]);
}

fn render_filters(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
    for (i, field) in Field::ALL.iter().enumerate() {
        let value = app.filters.get(*field).unwrap_or("All");
        let border_style = if i == app.focus {
            Style::new()
                .fg(app.colors.selected_style_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::new().fg(app.colors.row_fg)
        };
        let select = Paragraph::new(value.to_string())
            .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
            .centered()
            .block(
                Block::bordered()
                    .title(field.label())
                    .border_style(border_style),
            );
        f.render_widget(select, chunks[i]);
    }
}

fn render_grade_table(f: &mut Frame, app: &App, rows: &[GradeRow], area: Rect) {
    let header_style = Style::default()
        .fg(app.colors.header_fg)
        .bg(app.colors.header_bg);

    let header = rows
        .iter()
        .map(|row| Cell::from(row.grade().to_string()))
        .collect::<Row>()
        .style(header_style)
        .height(1);
    let balances = rows
        .iter()
        .map(|row| Cell::from(row.balance().to_string()))
        .collect::<Row>()
        .style(
            Style::new()
                .fg(app.colors.row_fg)
                .bg(app.colors.normal_row_color),
        )
        .height(1);

    let widths = constraint_len_calculator(rows)
        .into_iter()
        // + 1 is for padding.
        .map(|len| Constraint::Min(len + 1))
        .collect::<Vec<_>>();
    let t = Table::new([balances], widths)
        .header(header)
        .bg(app.colors.buffer_bg)
        .block(
            Block::bordered()
                .title("Current balance by grade")
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(t, area);
}

fn render_chart(f: &mut Frame, app: &App, totals: &[GradeTotal], area: Rect) {
    let bars = totals
        .iter()
        .map(|total| {
            Bar::default()
                .label(Line::from(format!("Grade {}", total.grade)))
                .value(total.balance.max(0.0) as u64)
                .text_value(crate::data::format_currency(total.balance))
                .style(Style::new().fg(app.colors.selected_style_fg))
                .value_style(
                    Style::new()
                        .fg(app.colors.header_fg)
                        .bg(app.colors.header_bg),
                )
        })
        .collect::<Vec<_>>();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(11)
        .bar_gap(2)
        .style(Style::new().bg(app.colors.buffer_bg))
        .block(
            Block::bordered()
                .title("Balance by grade")
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(chart, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let info_footer = Paragraph::new(Line::from(INFO_TEXT))
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(info_footer, area);
}

fn constraint_len_calculator(rows: &[GradeRow]) -> Vec<u16> {
    rows.iter()
        .map(|row| {
            UnicodeWidthStr::width(row.grade()).max(UnicodeWidthStr::width(row.balance())) as u16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<Record> {
        vec![
            Record::new(
                "2018".to_string(),
                "Q1".to_string(),
                "A".to_string(),
                "RENT".to_string(),
                "36 months".to_string(),
                "1000.00".to_string(),
            ),
            Record::new(
                "2018".to_string(),
                "Q1".to_string(),
                "B".to_string(),
                "OWN".to_string(),
                "60 months".to_string(),
                "2000.50".to_string(),
            ),
            Record::new(
                "2019".to_string(),
                "Q2".to_string(),
                "A".to_string(),
                "RENT".to_string(),
                "36 months".to_string(),
                "500.00".to_string(),
            ),
        ]
    }

    fn loaded_app() -> App {
        let records = fixture();
        let mut loader = Loader::new(Duration::ZERO);
        loader.start_with(move || Ok(records));
        loader.wait();
        App::new(loader)
    }

    #[test]
    fn constraint_len_calculator() {
        let rows = vec![
            GradeRow {
                grade: "Grade A".to_string(),
                balance: "$1500.00".to_string(),
            },
            GradeRow {
                grade: "Grade B".to_string(),
                balance: "$2000.50".to_string(),
            },
        ];
        let widths = super::constraint_len_calculator(&rows);
        assert_eq!(widths, vec![8, 8]);
    }

    #[test]
    fn value_cycling_walks_all_then_options_then_all() {
        let mut app = loaded_app();
        assert_eq!(app.focused_field(), Field::Year);
        assert_eq!(app.filters.year, None);

        app.next_value();
        assert_eq!(app.filters.year.as_deref(), Some("2018"));
        app.next_value();
        assert_eq!(app.filters.year.as_deref(), Some("2019"));
        app.next_value();
        assert_eq!(app.filters.year, None);

        app.previous_value();
        assert_eq!(app.filters.year.as_deref(), Some("2019"));
    }

    #[test]
    fn focus_moves_across_the_four_fields() {
        let mut app = loaded_app();
        app.next_field();
        assert_eq!(app.focused_field(), Field::Quarter);
        app.previous_field();
        app.previous_field();
        assert_eq!(app.focused_field(), Field::Term);
    }

    #[test]
    fn totals_follow_the_active_filters() {
        let mut app = loaded_app();
        app.filters.set(Field::Quarter, Some("Q1".to_string()));
        let totals = app.totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].grade, "A");
        assert_eq!(totals[0].balance, 1000.0);
        assert_eq!(totals[1].balance, 2000.5);
    }

    #[test]
    fn reset_returns_to_the_unfiltered_view() {
        let mut app = loaded_app();
        app.filters.set(Field::Year, Some("2019".to_string()));
        app.reset_filters();
        assert_eq!(app.filters, Constraints::default());
        assert_eq!(app.totals().len(), 2);
    }
}
