pub mod check;
pub mod compare;
pub mod config;
pub mod floor;
pub mod revenue;
