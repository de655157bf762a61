//! Wire protocol
//!
//! - `/ws`: binary image frames in, [`StreamReply`] JSON out
//! - `/ws/control`: [`ControlCommand`] JSON in, [`ControlReply`] JSON out
//! - `/ws/test`: free text in, [`EchoEvent`] JSON out

pub mod catalog;
pub mod message;

pub use catalog::{PoseCatalog, POSES};
pub use message::{
    ControlCommand, ControlEvent, ControlReply, EchoEvent, ErrorCode, ErrorReply, StreamReply,
};
