// Interface adapters: wire protocol, server sockets, and the headless client.

pub mod clients;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
