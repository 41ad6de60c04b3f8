pub mod cmds;
pub mod conductors;
pub mod config;
pub mod constructors;
pub mod controllers;
pub mod entities;
pub mod fixtures;
pub mod interactors;
pub mod presenters;
pub mod repositories;
pub mod session;
pub mod usecases;
pub(crate) mod utils;

pub use conductors::Conductor;
pub use config::Config;
pub use constructors::*;
pub use controllers::PostStatsController;
pub use session::Session;
