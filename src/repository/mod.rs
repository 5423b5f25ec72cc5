pub mod advert;
pub mod category;
pub mod location;
pub mod user;

pub use advert::AdvertRepository;
pub use category::CategoryRepository;
pub use location::LocationRepository;
pub use user::UserRepository;
