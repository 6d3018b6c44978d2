//! Jigsaw puzzle game: pictures are cut into interlocking pieces that snap together into
//! growing groups until the picture is whole.

pub mod app;
pub mod edge;
pub mod error;
pub mod geom;
pub mod groups;
pub mod piece;
pub mod puzzle;
pub mod session;
pub mod settings;
pub mod sfx;
pub mod texture;
pub mod view;

pub use error::{LoadError, PuzzleError};
pub use geom::{Direction, Point};
pub use puzzle::{DropOutcome, Puzzle, PuzzleConfig};
pub use session::Session;
