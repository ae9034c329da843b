pub mod events;

pub use events::{FlightNotification, RatingNotification, RoomJoin, FlightRoom, SocketAck};
