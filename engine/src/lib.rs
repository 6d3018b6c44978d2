//! Windowing, input, drawing and sound-cue collaborators for small 2D games.
//!
//! Game crates implement `app::GameApp` and draw through `graphics::Renderer2d`; everything that
//! touches the OS (window, pixel presentation) stays inside `app` and `pixels_renderer`.

pub mod app;
pub mod audio;
pub mod graphics;
pub mod pixels_renderer;
pub mod surface;
pub mod ui;
