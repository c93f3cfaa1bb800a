pub mod filters;
pub mod reports_service;
pub mod sql_builder;
