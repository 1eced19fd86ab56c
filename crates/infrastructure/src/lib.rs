pub mod bus;
pub mod dns;
