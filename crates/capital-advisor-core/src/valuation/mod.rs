pub mod dcf;
pub mod estimates;
pub mod sensitivity;
pub mod wacc;
