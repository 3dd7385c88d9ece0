pub mod dashboard;
pub mod header;
pub mod keymap;
pub mod pairing;
pub mod prompt;
pub mod settings;
pub mod tabs;
pub mod theme;
pub mod transaction;
pub mod util;
