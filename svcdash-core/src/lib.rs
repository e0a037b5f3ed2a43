pub mod config;
pub mod directory;
pub mod engine;
pub mod model;
pub mod reducer;
pub mod state;

// Pure view-side helpers
pub mod filter;
pub mod viewport;

// Control and polling bookkeeping owned by the engine
pub mod action;
pub mod notify;
pub mod poll;

#[cfg(test)]
mod testing;
