use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, stdout, Stdout},
    thread,
    time::{Duration, Instant},
};

use blockfall::game::{
    visible_view, Board, Game, GameEvent, GameState, BOARD_WIDTH, TICK_PERIOD, VISIBLE_ROWS,
    VISIBLE_START_ROW,
};
use blockfall::grid::{Cell, CellGrid, Pos};
use blockfall::tetromino::Tetromino;

// ============================================================================
// Visual Constants
// ============================================================================

const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

// ============================================================================
// Color Mapping
// ============================================================================

fn cell_color(cell: Cell) -> Color {
    match cell {
        Cell::I => Color::Rgb(0x34, 0xdb, 0xeb),
        Cell::J => Color::Rgb(0x08, 0x36, 0x73),
        Cell::L => Color::Rgb(0xeb, 0x81, 0x00),
        Cell::O => Color::Rgb(0xff, 0xdd, 0x00),
        Cell::S => Color::Rgb(0x09, 0x87, 0x00),
        Cell::Z => Color::Rgb(0xcc, 0x2c, 0x00),
        Cell::T => Color::Rgb(0x96, 0x96, 0x96),
        Cell::Empty => Color::Reset,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, paused: bool) {
    let area = frame.size();
    render_playfield(frame, &game.visible_cells(), game, area);
    if paused {
        render_paused(frame, area);
    } else if game.state == GameState::GameOver {
        render_game_over(frame, game, area);
    }
}

fn render_playfield(frame: &mut Frame, cells: &[Vec<Cell>], game: &Game, area: Rect) {
    let grid_display_width = (BOARD_WIDTH as u16 * 2) + 2;
    let grid_display_height = VISIBLE_ROWS as u16 + 2;
    let side_width = 14;
    let total_width = grid_display_width + side_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    render_grid(frame, cells, horizontal[0]);
    render_side_panel(frame, game, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };
    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Drop | ↑: Rotate | Space: Hard Drop | P: Pause | Q: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, cells: &[Vec<Cell>], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for row in cells {
        let mut spans: Vec<Span> = Vec::new();
        for &cell in row {
            let (symbol, style) = match cell {
                Cell::Empty => (EMPTY_CHAR, Style::default()),
                filled => (BLOCK_CHAR, Style::default().fg(cell_color(filled))),
            };
            spans.push(Span::styled(symbol, style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_side_panel(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.extend(piece_lines(&game.next));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Score",
        Style::default().fg(Color::Yellow),
    )));
    lines.push(Line::from(format!("{}", game.score)));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn piece_lines(piece: &Tetromino) -> Vec<Line<'static>> {
    let size = piece.size();
    let mut lines = Vec::new();
    for y in 0..size.height {
        let mut spans: Vec<Span> = Vec::new();
        for x in 0..size.width {
            let cell = piece.get(Pos::new(x, y));
            if cell.is_empty() {
                spans.push(Span::raw(EMPTY_CHAR));
            } else {
                spans.push(Span::styled(
                    BLOCK_CHAR,
                    Style::default().fg(cell_color(cell)),
                ));
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(""),
        Line::from(Span::styled(
            "Space: restart",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 11, area));
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "P: continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 9, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Row Flash
// ============================================================================

/// Blocking line-clear flash: alternates between the pre-collapse snapshot
/// and the same snapshot with the cleared rows blanked. Input is not
/// processed for the duration, matching the intended freeze on line clears.
fn flash_rows(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &Game,
    board: &Board,
    rows: &[usize],
    toggles: u32,
    interval: Duration,
) -> io::Result<()> {
    let view = visible_view(board);
    let size = view.size();
    let mut snapshot = vec![vec![Cell::Empty; size.width]; size.height];
    for (y, row) in snapshot.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = view.get(Pos::new(x, y));
        }
    }

    let mut blanked = snapshot.clone();
    for &row in rows {
        if row >= VISIBLE_START_ROW {
            blanked[row - VISIBLE_START_ROW].fill(Cell::Empty);
        }
    }

    for i in 0..toggles {
        let cells = if i % 2 == 0 { &blanked } else { &snapshot };
        terminal.draw(|frame| render_playfield(frame, cells, game, frame.size()))?;
        thread::sleep(interval);
    }
    Ok(())
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> io::Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut game = Game::new();
    let mut paused = false;
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, &game, paused))?;

        let timeout = TICK_PERIOD
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            paused = !paused;
                        }
                        _ if !paused && game.state == GameState::Running => match key.code {
                            KeyCode::Left => {
                                game.move_left();
                            }
                            KeyCode::Right => {
                                game.move_right();
                            }
                            KeyCode::Down => {
                                game.soft_drop();
                            }
                            KeyCode::Up => {
                                game.rotate_ccw();
                            }
                            KeyCode::Char(' ') => {
                                game.hard_drop();
                            }
                            _ => {}
                        },
                        KeyCode::Char(' ') if !paused => {
                            game.reset();
                        }
                        _ => {}
                    }
                    // Any keypress defers the next gravity tick.
                    last_tick = Instant::now();
                }
            }
        }

        if !paused && last_tick.elapsed() >= TICK_PERIOD {
            game.tick();
            last_tick = Instant::now();
        }

        for event in game.take_events() {
            if let GameEvent::RowFlash {
                board,
                rows,
                toggles,
                interval,
            } = event
            {
                flash_rows(&mut terminal, &game, &board, &rows, toggles, interval)?;
                last_tick = Instant::now();
            }
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
