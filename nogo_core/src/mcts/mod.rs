pub mod algorithm;
pub mod node;
pub mod rollout_policy;
mod utils;
