pub mod stats;

pub use stats::{LikeIcon, SaveIcon, StatsView, Surface};
