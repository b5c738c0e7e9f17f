pub mod parse;
pub mod show_address;
pub mod show_tx;
pub mod test_rpc;
pub mod update_indexes;
