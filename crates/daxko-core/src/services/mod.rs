pub mod members;
pub mod sso;

pub use members::MemberService;
pub use sso::{RedirectRegistration, SsoService};
