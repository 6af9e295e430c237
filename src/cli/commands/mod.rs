pub mod spo;
pub mod teams;
pub mod user;

pub use spo::handle_spo_command;
pub use teams::handle_teams_command;
pub use user::handle_user_command;
