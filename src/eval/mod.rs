pub mod bucketing;
pub mod details;
pub mod evaluator;
pub mod rule;
