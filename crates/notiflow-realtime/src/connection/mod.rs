//! Real-time connection lifecycle: transport seam, rooms, and the manager.

pub mod manager;
pub mod memory;
pub mod rooms;
pub mod state;
pub mod transport;
pub mod ws;

pub use manager::ConnectionManager;
pub use memory::{MemoryConnector, MemoryPeer, MemoryServer};
pub use rooms::RoomMembership;
pub use state::ConnectionState;
pub use transport::{Connector, TransportSession};
pub use ws::WsConnector;
