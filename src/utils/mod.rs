pub mod format;

pub use format::{abbreviate, format_grouped, format_locale, unabbreviate};
