pub mod tracker;

pub use tracker::HeadTracker;
