pub mod matcher;
pub mod reader;
pub mod logging;

pub use matcher::MatcherConfig;
pub use reader::ReaderConfig;
pub use logging::LoggingConfig;
