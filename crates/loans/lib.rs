pub use self::{
    loader::{LoadState, Loader},
    record::{Record, RecordVec},
    source::SourceError,
};

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod record;
pub mod source;
