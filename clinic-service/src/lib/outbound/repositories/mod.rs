pub mod document;
pub mod link;
pub mod session;
pub mod user;

pub use document::PostgresDocumentRepository;
pub use link::PostgresLinkRepository;
pub use session::PostgresSessionStore;
pub use user::PostgresUserRepository;
