pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;

pub use claims::Claims;
pub use claims::CredentialKind;
pub use claims::IdentityClaim;
pub use claims::Role;
pub use codec::CredentialCodec;
pub use codec::KindSettings;
pub use codec::TokenPair;
pub use errors::JwtError;
pub use handler::JwtHandler;
