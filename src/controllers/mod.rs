pub mod post_stats;

pub use post_stats::PostStatsController;
