pub mod advert;
pub mod category;
pub mod health;
pub mod location;
pub mod user;
