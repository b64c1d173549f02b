//! Drawing a [`Surface`] in the terminal
//!
//! Each pixel is two cells wide so the grid looks roughly square. Text
//! labels are overlaid on the cells they start at.

use crate::ui::theme::DEFAULT_THEME;
use crate::ui::window::Surface;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;

const CELLS_PER_PIXEL: usize = 2;

/// What a screen reports back between frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Key(String),
    Close,
}

pub trait Screen {
    fn draw(&mut self, title: &str, surface: &Surface) -> io::Result<()>;

    /// Drain pending input without blocking
    fn poll_events(&mut self) -> io::Result<Vec<ScreenEvent>>;
}

/// Alternate-screen terminal in raw mode, restored on drop
pub struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalScreen {
    pub fn open() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(TerminalScreen { terminal })
    }
}

impl Screen for TerminalScreen {
    fn draw(&mut self, title: &str, surface: &Surface) -> io::Result<()> {
        self.terminal
            .draw(|frame| render_surface(frame, title, surface))?;
        Ok(())
    }

    fn poll_events(&mut self) -> io::Result<Vec<ScreenEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_interrupt(&key) {
                    events.push(ScreenEvent::Close);
                } else if let Some(name) = key_name(key.code) {
                    events.push(ScreenEvent::Key(name));
                }
            }
        }
        Ok(events)
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
}

/// Key names in the spelling scripts use (`left`, `space`, `a`, ...)
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Enter => "return".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::F(n) => format!("f{}", n),
        _ => return None,
    };
    Some(name)
}

/// Render the pixel grid inside a titled border
pub fn render_surface(frame: &mut Frame, title: &str, surface: &Surface) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(DEFAULT_THEME.title)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border))
        .style(Style::default().bg(DEFAULT_THEME.backdrop));

    let columns = surface.width() * CELLS_PER_PIXEL;
    let mut rows: Vec<Vec<(char, Style)>> = (0..surface.height())
        .map(|y| {
            (0..columns)
                .map(|col| {
                    let color = surface.pixel(col / CELLS_PER_PIXEL, y);
                    (' ', Style::default().bg(color))
                })
                .collect()
        })
        .collect();

    for label in surface.labels() {
        if label.y < 0 || label.y as usize >= rows.len() || label.x < 0 {
            continue;
        }
        let row = &mut rows[label.y as usize];
        let start = label.x as usize * CELLS_PER_PIXEL;
        for (offset, ch) in label.text.chars().enumerate() {
            let Some(cell) = row.get_mut(start + offset) else {
                break;
            };
            *cell = (ch, cell.1.fg(label.color).add_modifier(Modifier::BOLD));
        }
    }

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(ch, style)| Span::styled(ch.to_string(), style))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), frame.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::window::TextLabel;
    use ratatui::{backend::TestBackend, style::Color};

    #[test]
    fn test_pixels_are_two_cells_wide() {
        let mut surface = Surface::new(3, 2, Color::Rgb(0, 0, 0));
        surface.set_pixel(1, 0, Color::Rgb(255, 0, 0));

        let mut terminal = Terminal::new(TestBackend::new(10, 5)).unwrap();
        terminal
            .draw(|frame| render_surface(frame, "Game", &surface))
            .unwrap();
        let buffer = terminal.backend().buffer();

        // Border occupies column 0 and row 0
        assert_eq!(buffer[(1, 1)].bg, Color::Rgb(0, 0, 0));
        assert_eq!(buffer[(3, 1)].bg, Color::Rgb(255, 0, 0));
        assert_eq!(buffer[(4, 1)].bg, Color::Rgb(255, 0, 0));
        assert_eq!(buffer[(5, 1)].bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_labels_overlay_pixels() {
        let mut surface = Surface::new(4, 2, Color::Rgb(0, 0, 0));
        surface.add_label(TextLabel {
            x: 1,
            y: 1,
            text: "Hi".to_string(),
            color: Color::Rgb(255, 255, 255),
            size: 12,
        });

        let mut terminal = Terminal::new(TestBackend::new(12, 5)).unwrap();
        terminal
            .draw(|frame| render_surface(frame, "T", &surface))
            .unwrap();
        let buffer = terminal.backend().buffer();

        assert_eq!(buffer[(3, 2)].symbol(), "H");
        assert_eq!(buffer[(4, 2)].symbol(), "i");
        assert_eq!(buffer[(3, 2)].fg, Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(KeyCode::Char(' ')), Some("space".to_string()));
        assert_eq!(key_name(KeyCode::Char('A')), Some("a".to_string()));
        assert_eq!(key_name(KeyCode::Enter), Some("return".to_string()));
        assert_eq!(key_name(KeyCode::Esc), Some("escape".to_string()));
        assert_eq!(key_name(KeyCode::Home), None);
    }
}
