pub mod seek;
pub mod time_format;
