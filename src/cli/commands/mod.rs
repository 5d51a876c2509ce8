pub mod code;
pub mod member;
pub mod migrate;
pub mod super_admin;
pub mod tenant;
pub mod token;
