pub mod access;
pub mod account_store;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod pricing;
pub mod stake;
pub mod supply;
pub mod transfer;
pub mod value_objects;

pub use access::*;
pub use account_store::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use pricing::*;
pub use supply::*;
pub use transfer::{apply_transfer, ensure_transferable, TransferOutcome};
pub use value_objects::*;
