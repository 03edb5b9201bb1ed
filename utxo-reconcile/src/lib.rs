pub mod config;
pub mod decimal;
pub mod error;
pub mod gather;
pub mod reconcile;
pub mod source;
pub mod ticker;
pub mod utxo;

#[macro_use]
extern crate log;

pub use config::*;
pub use decimal::*;
pub use error::*;
pub use gather::*;
pub use reconcile::*;
pub use source::{ChainSource, ChainSourceRef, create_source};
pub use ticker::*;
pub use utxo::*;
