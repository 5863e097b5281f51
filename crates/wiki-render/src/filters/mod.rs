//! Built-in filters of the standard rendering chain.

mod code;
mod escape;
mod heading;
mod link;
mod list;
mod style;

pub use code::{CodeProtectFilter, CodeRestoreFilter};
pub use escape::EscapeFilter;
pub use heading::HeadingFilter;
pub use link::LinkFilter;
pub use list::ListFilter;
pub use style::{BoldFilter, ItalicFilter};
