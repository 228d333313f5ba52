pub mod courier;
pub mod order;
pub mod plan;
pub mod point;
