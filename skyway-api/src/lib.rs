extern crate skyway_core;

pub mod airlines;
pub mod airports;
pub mod auth;
pub mod bookings;
pub mod client;
pub mod countdown;
pub mod error;
pub mod flights;
pub mod ratings;
pub mod reports;
pub mod socket;
pub mod users;

pub use airlines::AirlinesApi;
pub use airports::AirportsApi;
pub use auth::AuthApi;
pub use bookings::BookingsApi;
pub use client::{ApiClient, SessionEvent};
pub use error::{ApiError, ApiResult};
pub use flights::FlightsApi;
pub use ratings::RatingsApi;
pub use reports::ReportsApi;
pub use users::UsersApi;
