pub mod block;
pub mod error;
pub mod filter;
pub mod graph;
pub mod hit;
pub mod interval;
pub mod io;
pub mod merge;
pub mod partition;
