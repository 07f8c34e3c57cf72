pub mod match_maker;
pub mod queue;
pub mod queue_manager;

pub use match_maker::MatchMaker;
pub use queue::Queue;
pub use queue_manager::QueueManager;
