pub mod credentials;
pub mod identity;
pub mod password;
pub mod policy;
pub mod store;
pub mod token;

pub use credentials::{CredentialError, CredentialService};
pub use identity::{IdentityError, IdentityService, Principal};
pub use policy::{Access, AccessPolicy, AccessRule, Decision, DenyReason};
pub use store::{CredentialStore, StoreError, UserRecord};
pub use token::{TokenError, TokenService};
