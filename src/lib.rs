pub mod access;
pub mod expression;
pub mod planner;
pub mod sql;
