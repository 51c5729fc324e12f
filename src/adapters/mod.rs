//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements        | Connects to           |
//! |------------------|-------------------|-----------------------|
//! | `endpoint_table` | EndpointRegistry  | In-memory table       |
//! | `log_sink`       | EventSink         | `log` facade          |

pub mod endpoint_table;
pub mod log_sink;

pub use endpoint_table::EndpointTable;
pub use log_sink::LogEventSink;
