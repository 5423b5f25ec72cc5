pub mod media;
pub mod password;
pub mod validation;

pub use media::MediaStore;
pub use password::{hash_password, verify_password};
pub use validation::{
    validate_advert_patch, validate_category_name, validate_new_advert, validate_new_location,
    validate_new_user, validate_user_patch,
};
