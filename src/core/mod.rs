pub mod completion;
pub mod config;
pub mod credentials;
pub mod message;
pub mod persona;
pub mod session;
pub mod store;
pub mod wizard;
