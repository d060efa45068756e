mod di;
mod mis;

pub use self::di::*;
pub use self::mis::*;
