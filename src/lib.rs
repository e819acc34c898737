//! This is a plugin for Bevy game engine to address the cells of an open
//! world split into sectors, search paths over them and steer crowds of
//! units with flow fields
//!

pub mod navigation;
pub mod plugin;

pub mod prelude;
