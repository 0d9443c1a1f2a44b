pub mod action;
pub mod app;
pub mod command;
pub mod completion;
pub mod config;
pub mod engine;
pub mod history;
pub mod input;
pub mod inputbar;
pub mod key;
pub mod logging;
pub mod mode;
pub mod paths;
pub mod persistence;
pub mod ports;
pub mod sequence;
pub mod settings;
pub mod shortcut;
pub mod ui;
pub mod uri;
pub mod view;
