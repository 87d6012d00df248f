pub mod blastn;
pub mod partition;
pub mod stat;
