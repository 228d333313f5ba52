pub mod dispatch;
pub mod planner;
pub mod queue;
pub mod worker;
pub mod zones;
