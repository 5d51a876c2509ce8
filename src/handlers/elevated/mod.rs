// handlers/elevated/mod.rs - platform operations
//
// Callable only by super admins, independent of the tenant the request
// arrived on. Work runs on an elevated handle after the flag check.

pub mod platform;
