// handlers/protected/mod.rs - endpoints that need a verified bearer token
//
// Visitor endpoints run under the caller's own session, so row-level
// policies limit them to the caller's rows. admin/ adds a tenant role check
// before switching to an elevated handle.

pub mod admin;
pub mod progress;
pub mod puzzle;
pub mod scan;
pub mod whoami;

pub use progress::progress_get;
pub use puzzle::puzzle_post;
pub use scan::scan_post;
pub use whoami::whoami;
