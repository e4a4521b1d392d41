pub mod auth_handler;

pub use auth_handler::{
    __path_login, __path_oauth_login, __path_phone_login, __path_register, login, oauth_login,
    phone_login, register,
};
