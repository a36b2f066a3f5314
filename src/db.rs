pub mod journal;
pub use journal::{Journal, PgJournal};
pub mod scoped;
pub use scoped::Scoped;
pub mod state;
pub use state::{ensure_version, ChangeSet, IamState, ObjectKey};
pub mod store;
pub use store::IamStore;
