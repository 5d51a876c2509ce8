pub mod animal;
pub mod membership;
pub mod profile;
pub mod progress;
pub mod redemption;
pub mod tenant;

pub use animal::{Animal, AnimalChanges, NewAnimal};
pub use membership::{Membership, NewMembership};
pub use profile::{NewProfile, Profile};
pub use progress::{NewProgress, Progress};
pub use redemption::{NewRedemption, Redemption};
pub use tenant::{Branding, NewTenant, Tenant};
