// matcher/mod.rs

pub mod similarity;
pub mod fuzzy;
pub mod pipeline;
pub mod search;

pub use self::similarity::token_set_ratio;
pub use self::fuzzy::{best, top_n};
pub use self::pipeline::{MatchingPipeline, MatchRequest, MatchOutcome, MatchSummary};
pub use self::search::{LiveSearch, MatchResult};
