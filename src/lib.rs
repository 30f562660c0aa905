use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod error;
pub mod opponent;
pub mod rules;
pub mod session;
pub mod sync;
pub mod turn;
pub mod types;
pub mod wasm;
pub mod win;

pub use wasm::CheckersGame;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
