mod jwt;
mod oauth_client;
mod token_manager;

pub use oauth_client::AccessToken;
pub use token_manager::TokenManager;
