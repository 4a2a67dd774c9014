//! Authentication primitives shared by the clinic backend.
//!
//! Everything in this crate is stateless and free of I/O:
//! - Password hashing (Argon2id)
//! - Access-token claims plus HS256 signing and validation
//! - Opaque token generation and one-way (peppered) hashing for
//!   refresh and password-reset tokens
//!
//! The service crate owns all persistence and flow logic; it composes
//! these pieces through its own ports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{AccessClaims, JwtHandler, UserClaim};
//! use chrono::Utc;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let user = UserClaim { id: 7, name: "Alice".into(), email: "alice@example.com".into() };
//! let claims = AccessClaims::issue("https://api.example.com/", 7, "patient", user, Utc::now(), 900);
//! let token = handler.encode(&claims).unwrap();
//! let decoded = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub, "7");
//! ```
//!
//! ## Opaque Tokens
//! ```
//! use auth::token;
//!
//! let plain = token::generate(64);
//! assert_eq!(plain.len(), 128);
//! let digest = token::hash(&plain, Some("pepper"));
//! assert_eq!(digest, token::hash(&plain, Some("pepper")));
//! ```

pub mod claims;
pub mod errors;
pub mod jwt;
pub mod password;
pub mod token;

pub use claims::AccessClaims;
pub use claims::UserClaim;
pub use errors::JwtError;
pub use errors::PasswordError;
pub use jwt::JwtHandler;
pub use password::PasswordHasher;
