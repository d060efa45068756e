mod double_buffered;
mod reservoir_buffer;

pub use self::double_buffered::*;
pub use self::reservoir_buffer::*;
