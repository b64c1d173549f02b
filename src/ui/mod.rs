//! Pixel display capability built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`window`]**: the pixel grid model, window lifecycle and key state
//! - **[`screen`]**: the [`screen::Screen`] seam and the crossterm-backed
//!   terminal screen
//! - **[`theme`]**: window chrome colors and color-name parsing
//!
//! Scripts reach all of this only through the display builtins
//! (`open_window`, `draw_pixel`, `poll_window`, ...).

pub mod screen;
pub mod theme;
pub mod window;

pub use window::PixelWindow;
