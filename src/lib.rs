//! gymsim - Gym roster simulator
//!
//! Registers trainers and members, assigns members to trainers, and
//! projects weight progress over simulated days or weeks.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod roster;
pub mod sim;
pub mod tui;
pub mod validate;

pub use db::Database;
