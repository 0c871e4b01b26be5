// parkgate/src/card/mod.rs

pub mod record;
pub mod session;

pub use record::TagRecord;
pub use session::{CardSession, PendingWrite, WriteStep};
