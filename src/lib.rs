pub mod config;
pub mod keywords;
pub mod logging;
pub mod notify;
pub mod relay;
pub mod source;

#[cfg(test)]
mod testing;
