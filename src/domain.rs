pub mod issuance;
pub mod ports;
pub mod verification;
