pub mod decision;
pub mod order;
