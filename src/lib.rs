//! Falling-block game engine: grid abstraction, tetromino model with
//! view-transform rotation, 7-bag piece provider, and the game state machine.
//!
//! Rendering and input live in the binary; the library exposes only data.

pub mod game;
pub mod grid;
pub mod provider;
pub mod tetromino;
