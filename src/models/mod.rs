pub mod cm;
pub mod views;
