pub mod binfmt;
pub mod browser;
pub mod builder;
pub mod config;
pub mod content;
pub mod error;
pub mod nav;
pub mod prefs;
pub mod probe;
pub mod query;
pub mod search;
pub mod source;
pub mod theme;
pub mod tree;

pub use error::{CoreError, CoreResult};
