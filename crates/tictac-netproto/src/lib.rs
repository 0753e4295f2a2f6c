//! Line-oriented wire protocol spoken between tictac peers and the server.
//!
//! Every message is one `\n`-terminated line: a [`msg_id::Keyword`] followed by
//! space-separated fields. See [`messages::server::ServerMsg`] and
//! [`messages::client::ClientMsg`] for the two directions.

pub mod codec;
pub mod constants;
pub mod error;
pub mod limits;
pub mod messages;
pub mod msg_id;

pub use codec::{decode_message, encode_message, try_decode_lines};
pub use error::ProtoError;
pub use messages::client::ClientMsg;
pub use messages::server::ServerMsg;
pub use msg_id::Keyword;
