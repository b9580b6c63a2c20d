mod helpers;
mod middleware;
mod password;
mod token;

pub use helpers::extract_bearer;
pub use middleware::AuthUser;
pub use password::{MIN_PASSWORD_LEN, PasswordVault};
pub use token::{Claims, TokenService};
