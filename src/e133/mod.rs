//! E1.33 device-side components: the root endpoint and its TCP statistics.

pub mod pid_table;
pub mod root_endpoint;
pub mod tcp_stats;

pub use root_endpoint::RootEndpoint;
pub use tcp_stats::{TcpConnectionStats, TcpStatsSnapshot};
