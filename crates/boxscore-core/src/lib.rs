// Shared infrastructure for the boxscore workspace.

pub mod cache;
