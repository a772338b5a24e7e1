// Domain layer: backend DTOs, their display helpers, and ports (interfaces).

pub mod budget;
pub mod calculation;
pub mod catalog;
pub mod dashboard;
pub mod decimal;
pub mod page;
pub mod ports;
pub mod project;
