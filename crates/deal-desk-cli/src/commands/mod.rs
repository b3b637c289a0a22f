pub mod credit;
pub mod desking;
pub mod fees;
pub mod gross;
pub mod payment;
