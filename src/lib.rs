// Library for tests to access modules

pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod metrics_sim;
pub mod models;
pub mod notify;
pub mod routes;
pub mod worker;
