//! Chain index type system
//!
//! - `address`: script classification, equiv families, address identity
//! - `chain`: stored block/tx/output/input/script records
//! - `state`: processing progress markers shared by parser and indexes

pub mod address;
mod chain;
mod state;

pub use address::{
    classify_script, encode_address, script_key, Address, AddressType, EquivAddressType,
    ScriptKey,
};
pub use chain::*;
pub use state::ChainState;
