pub mod batch;
pub mod cycles;
pub mod init;
pub mod report;
