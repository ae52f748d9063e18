pub mod career;
pub mod conversation;
