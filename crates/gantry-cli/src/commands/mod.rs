pub mod check;
pub mod deploy;
