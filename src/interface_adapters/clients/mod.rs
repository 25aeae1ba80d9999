// Outbound clients that talk to a pool server.

pub mod pool;

pub use pool::{ClientError, PoolClient, PoolConnection, ReconnectPolicy, connect_with_retry};
