pub mod deal;
pub mod payment;
pub mod scenario;
