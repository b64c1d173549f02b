//! Pixel window model
//!
//! [`Surface`] is the drawing grid; [`PixelWindow`] adds the open/close
//! lifecycle, per-frame key state and an optional [`Screen`] to show the
//! grid on. Coordinates are in pixels; anything outside the grid is
//! silently clipped.

use crate::interpreter::settings::DisplayMode;
use crate::ui::screen::{Screen, ScreenEvent, TerminalScreen};
use crate::ui::theme::parse_color;
use ratatui::style::Color;
use rustc_hash::FxHashSet;

pub const DEFAULT_TITLE: &str = "E++ Pixel Window";
pub const DEFAULT_PIXEL_SIZE: i64 = 10;
const MIN_TEXT_SIZE: i64 = 6;
/// Largest grid a window may hold
pub const MAX_WINDOW_PIXELS: usize = 4_000_000;

const NO_WINDOW: &str = "No window is open. Call 'call open_window with ...' first.";

/// A text label drawn on top of the pixels
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub x: i64,
    pub y: i64,
    pub text: String,
    pub color: Color,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    background: Color,
    pixels: Vec<Option<Color>>,
    labels: Vec<TextLabel>,
}

impl Surface {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Surface {
            width,
            height,
            background,
            pixels: vec![None; width * height],
            labels: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    /// Color at a position, the background where nothing was drawn
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        if x >= self.width || y >= self.height {
            return self.background;
        }
        self.pixels[y * self.width + x].unwrap_or(self.background)
    }

    /// Wipe all drawing, optionally switching the background
    pub fn clear(&mut self, background: Option<Color>) {
        if let Some(color) = background {
            self.background = color;
        }
        self.pixels.iter_mut().for_each(|p| *p = None);
        self.labels.clear();
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = Some(color);
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x_end = x.saturating_add(w).min(self.width as i64);
        let y_end = y.saturating_add(h).min(self.height as i64);
        for py in y.max(0)..y_end {
            for px in x.max(0)..x_end {
                self.set_pixel(px, py, color);
            }
        }
    }

    pub fn add_label(&mut self, label: TextLabel) {
        self.labels.push(label);
    }
}

/// Window lifecycle and input state behind the display builtins
pub struct PixelWindow {
    mode: DisplayMode,
    surface: Option<Surface>,
    title: String,
    pixel_size: i64,
    screen: Option<Box<dyn Screen>>,
    keys_down: FxHashSet<String>,
    keys_pressed: FxHashSet<String>,
    /// Keys delivered on the next poll when no screen is attached
    pending_keys: Vec<String>,
}

impl PixelWindow {
    pub fn new(mode: DisplayMode) -> Self {
        PixelWindow {
            mode,
            surface: None,
            title: DEFAULT_TITLE.to_string(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            screen: None,
            keys_down: FxHashSet::default(),
            keys_pressed: FxHashSet::default(),
            pending_keys: Vec::new(),
        }
    }

    pub fn open(
        &mut self,
        width: i64,
        height: i64,
        title: &str,
        pixel_size: i64,
        background: &str,
    ) -> Result<bool, String> {
        if width <= 0 || height <= 0 {
            return Err("Window size must be greater than zero.".to_string());
        }
        if pixel_size <= 0 {
            return Err("Pixel size must be greater than zero.".to_string());
        }
        let (width, height) = (width as usize, height as usize);
        if width.checked_mul(height).map_or(true, |cells| cells > MAX_WINDOW_PIXELS) {
            return Err(format!(
                "A {}x{} window is too big. Keep it under {} pixels in total.",
                width, height, MAX_WINDOW_PIXELS
            ));
        }
        let background = color(background)?;

        self.close();
        if self.mode == DisplayMode::Terminal {
            let screen = TerminalScreen::open().map_err(|e| {
                format!(
                    "I could not open a window in this terminal ({}). Try running with --headless.",
                    e
                )
            })?;
            self.screen = Some(Box::new(screen));
        }
        self.surface = Some(Surface::new(width, height, background));
        self.title = title.to_string();
        self.pixel_size = pixel_size;
        self.present();
        Ok(true)
    }

    pub fn close(&mut self) {
        // Dropping the screen restores the terminal
        self.screen = None;
        self.surface = None;
        self.keys_down.clear();
        self.keys_pressed.clear();
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Pixel size requested at open; the terminal always draws one cell pair
    pub fn pixel_size(&self) -> i64 {
        self.pixel_size
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Advance one frame: collect key events and redraw.
    pub fn poll(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.keys_pressed.clear();
        self.keys_down.clear();

        let events = match self.screen.as_mut() {
            Some(screen) => match screen.poll_events() {
                Ok(events) => events,
                Err(_) => vec![ScreenEvent::Close],
            },
            None => self
                .pending_keys
                .drain(..)
                .map(ScreenEvent::Key)
                .collect(),
        };

        for event in events {
            match event {
                ScreenEvent::Key(name) => {
                    let key = normalize_key(&name);
                    self.keys_down.insert(key.clone());
                    self.keys_pressed.insert(key);
                }
                ScreenEvent::Close => {
                    self.close();
                    return false;
                }
            }
        }

        self.present();
        self.is_open()
    }

    pub fn present(&mut self) {
        let (Some(screen), Some(surface)) = (self.screen.as_mut(), self.surface.as_ref()) else {
            return;
        };
        if screen.draw(&self.title, surface).is_err() {
            self.close();
        }
    }

    pub fn clear(&mut self, background: Option<&str>) -> Result<(), String> {
        let background = background.map(color).transpose()?;
        self.surface_mut()?.clear(background);
        Ok(())
    }

    pub fn draw_pixel(&mut self, x: i64, y: i64, color_name: &str) -> Result<(), String> {
        let color = color(color_name)?;
        self.surface_mut()?.set_pixel(x, y, color);
        Ok(())
    }

    pub fn draw_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color_name: &str) -> Result<(), String> {
        let color = color(color_name)?;
        self.surface_mut()?.fill_rect(x, y, w, h, color);
        Ok(())
    }

    pub fn draw_text(
        &mut self,
        x: i64,
        y: i64,
        text: &str,
        color_name: &str,
        size: i64,
    ) -> Result<(), String> {
        let color = color(color_name)?;
        self.surface_mut()?.add_label(TextLabel {
            x,
            y,
            text: text.to_string(),
            color,
            size: size.max(MIN_TEXT_SIZE),
        });
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.surface_mut()?;
        self.title = title.to_string();
        Ok(())
    }

    /// Key held during the latest poll
    pub fn key_down(&self, name: &str) -> bool {
        self.keys_down.contains(&normalize_key(name))
    }

    /// Key first seen during the latest poll
    pub fn key_pressed(&self, name: &str) -> bool {
        self.keys_pressed.contains(&normalize_key(name))
    }

    /// Queue a key for the next poll of a headless window
    pub fn press_key(&mut self, name: &str) {
        self.pending_keys.push(name.to_string());
    }

    fn surface_mut(&mut self) -> Result<&mut Surface, String> {
        self.surface.as_mut().ok_or_else(|| NO_WINDOW.to_string())
    }
}

fn color(name: &str) -> Result<Color, String> {
    parse_color(name).ok_or_else(|| format!("I don't know the color '{}'.", name))
}

/// Lowercase key names with the common aliases folded in
pub fn normalize_key(name: &str) -> String {
    let key = name.trim().to_lowercase();
    match key.as_str() {
        "esc" => "escape".to_string(),
        "enter" => "return".to_string(),
        "spacebar" | " " => "space".to_string(),
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless() -> PixelWindow {
        let mut window = PixelWindow::new(DisplayMode::Headless);
        window.open(4, 3, "Test", 10, "black").unwrap();
        window
    }

    #[test]
    fn test_open_validates_sizes() {
        let mut window = PixelWindow::new(DisplayMode::Headless);
        assert_eq!(
            window.open(0, 3, "T", 10, "black"),
            Err("Window size must be greater than zero.".to_string())
        );
        assert_eq!(
            window.open(3, 3, "T", 0, "black"),
            Err("Pixel size must be greater than zero.".to_string())
        );
        assert!(!window.is_open());
    }

    #[test]
    fn test_open_refuses_huge_windows() {
        let mut window = PixelWindow::new(DisplayMode::Headless);
        let err = window.open(4_294_967_296, 4_294_967_296, "T", 10, "black").unwrap_err();
        assert!(err.contains("too big"), "got {}", err);
        assert!(window.open(i64::MAX, 2, "T", 10, "black").is_err());
        assert!(window.open(2001, 2000, "T", 10, "black").is_err());
        assert!(!window.is_open());

        window.open(2000, 2000, "T", 1, "black").unwrap();
        assert!(window.is_open());
    }

    #[test]
    fn test_drawing_clips_to_grid() {
        let mut window = headless();
        window.draw_pixel(1, 1, "red").unwrap();
        window.draw_pixel(9, 9, "red").unwrap();
        window.draw_rect(2, 0, 5, 2, "#00ff00").unwrap();
        window.draw_rect(0, 0, 0, 5, "blue").unwrap();

        let surface = window.surface().unwrap();
        assert_eq!(surface.pixel(1, 1), Color::Rgb(255, 0, 0));
        assert_eq!(surface.pixel(3, 1), Color::Rgb(0, 255, 0));
        assert_eq!(surface.pixel(0, 0), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_clear_changes_background() {
        let mut window = headless();
        window.draw_pixel(0, 0, "red").unwrap();
        window.clear(Some("white")).unwrap();
        assert_eq!(window.surface().unwrap().pixel(0, 0), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_text_size_has_a_floor() {
        let mut window = headless();
        window.draw_text(0, 0, "hi", "white", 2).unwrap();
        assert_eq!(window.surface().unwrap().labels()[0].size, 6);
    }

    #[test]
    fn test_drawing_needs_an_open_window() {
        let mut window = PixelWindow::new(DisplayMode::Headless);
        assert_eq!(window.draw_pixel(0, 0, "red"), Err(NO_WINDOW.to_string()));
        assert!(!window.poll());
    }

    #[test]
    fn test_keys_last_one_frame() {
        let mut window = headless();
        window.press_key("Enter");
        assert!(window.poll());
        assert!(window.key_pressed("return"));
        assert!(window.key_down("enter"));

        assert!(window.poll());
        assert!(!window.key_pressed("return"));
    }

    #[test]
    fn test_unknown_color_is_an_error() {
        let mut window = headless();
        assert!(window.draw_pixel(0, 0, "blurple").is_err());
    }
}
