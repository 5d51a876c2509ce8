pub mod member_service;
pub mod puzzle_service;
pub mod redemption_service;
pub mod scan_service;
pub mod station_service;
pub mod tenant_service;

pub use puzzle_service::{validate_puzzle_answer, PuzzleResult};
pub use scan_service::{record_scan, ScanResult};
pub use tenant_service::{TenantChanges, TenantService, TenantServiceError};
