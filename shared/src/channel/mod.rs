mod data_message;
mod opcode;
mod view_message;
mod wire;

pub use data_message::DataMessage;
pub use opcode::ChannelEventType;
pub use view_message::ViewMessage;
pub use wire::{ArgReader, ArgValue, ArgWriter, WireMessage};
