//! avidin-forest
//!
//! A seeded random-forest regressor over dense `f32` feature matrices,
//! plus the regression metrics reported against a held-out set. Trees are
//! grown by recursive binary splitting on squared error; the forest bags
//! bootstrap samples and averages its trees.
pub mod forest;
pub mod metrics;
mod tree;

pub use forest::{MaxFeatures, RandomForestConfig, RandomForestRegressor};
pub use metrics::{evaluate, mean_absolute_error, mean_squared_error, r2_score, EvalReport};
