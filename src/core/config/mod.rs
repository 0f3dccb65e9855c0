pub mod data;
pub mod io;

pub use data::{path_display, Settings};
pub use io::SettingsError;

#[cfg(test)]
pub mod tests;
