//! Embedded Lua for text documents.
//!
//! Documents carry Lua between `<?lua` and `?>`.  [`interpret`] runs each
//! region and puts whatever it `print`s where the region stood, leaving the
//! rest of the text alone.  The [`site`] layer maps request paths onto
//! documents under a root directory and runs them through the same pass.

pub mod cli;
pub mod config;
pub mod error;
pub mod interpret;
pub mod marker;
pub mod session;
pub mod sink;
pub mod site;

pub use error::Error;
pub use interpret::{interpret, render};
pub use session::Session;
