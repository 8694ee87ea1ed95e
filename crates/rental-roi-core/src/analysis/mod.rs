pub mod cash_flow;
pub mod property;
pub mod returns;
