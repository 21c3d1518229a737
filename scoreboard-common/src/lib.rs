pub mod client;

pub mod session_file;

pub mod stats;
