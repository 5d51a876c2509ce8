// handlers/mod.rs - handlers grouped by who may call them
//
// public:    no bearer token needed (tenant lookup, station listing, health)
// protected: bearer token required; admin/ additionally needs a tenant role
// elevated:  platform operations for super admins

pub mod elevated;
pub mod protected;
pub mod public;
