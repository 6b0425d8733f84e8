//! Room chat server.
//!
//! - [`chat_server`] binds the control (TCP) and data (UDP) sockets and
//!   spawns one task per connection and one per datagram.
//! - [`tcp_handler`] and [`tcp_command_handler`] serve the one-shot control
//!   exchange: create, search and join.
//! - [`udp_handler`] learns member addresses and fans chat messages out.
//! - [`room_registry`] is the single owner of rooms and members.

pub mod chat_server;
pub mod room;
pub mod room_registry;
pub mod tcp_command_handler;
pub mod tcp_handler;
pub mod udp_handler;
