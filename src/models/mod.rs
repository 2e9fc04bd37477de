pub mod rating;
pub mod temporal;
pub mod velocity;

pub use rating::{GamePrediction, RatingConfig, RatingModel, RatingStore};
pub use temporal::{RestAnalysis, TemporalEngine, TemporalFactors};
pub use velocity::{SteamDirection, VelocityAnalysis, VelocityConfig, VelocityTracker};
