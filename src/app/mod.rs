pub mod budgets;
pub mod calculator;
pub mod dashboard;
pub mod export;
pub mod projects;
pub mod suppliers;
