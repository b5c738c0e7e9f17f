use crate::common::fixtures::{coinbase, fund_tx, make_block, COINBASE_VALUE, FEE, FUND_VALUE};
use blockindex::database::{ChainReadOperations, Database};
use blockindex::parser::ChainParser;
use blockindex::types::{AddressType, EquivAddressType};
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, Network};

fn in_memory_parser() -> ChainParser {
    ChainParser::new(Database::new(":memory:").unwrap(), Network::Regtest).unwrap()
}

#[test]
fn test_single_coinbase_block() {
    let mut parser = in_memory_parser();
    let block = make_block(BlockHash::all_zeros(), 0, vec![coinbase(0)]);

    let stats = parser.ingest_block(&block).unwrap();
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.transactions, 1);
    assert_eq!(stats.inputs, 0);
    assert_eq!(stats.new_scripts, 1);

    let db = parser.database();
    let record = db.get_block(0).unwrap().unwrap();
    assert_eq!(record.hash, block.block_hash().to_string());
    assert_eq!(record.first_tx_index, 0);
    assert_eq!(record.size_bytes as usize, block.total_size());

    let tx = db.get_tx(0).unwrap().unwrap();
    assert!(tx.is_coinbase);
    assert_eq!(tx.input_count, 0);
    assert_eq!(tx.output_count, 1);
    assert!(db.get_inputs(0).unwrap().is_empty());

    let output = db.get_output(0, 0).unwrap().unwrap();
    assert_eq!(output.value, COINBASE_VALUE);
    assert_eq!(output.address_type, AddressType::Pubkeyhash);
    assert_eq!(output.script_num, 1);
    assert!(!output.is_spent());
}

#[test]
fn test_spend_in_next_block() {
    let mut parser = in_memory_parser();
    let genesis = make_block(BlockHash::all_zeros(), 0, vec![coinbase(0)]);
    let fund = fund_tx(genesis.txdata[0].compute_txid());
    let next = make_block(genesis.block_hash(), 1, vec![coinbase(1), fund]);

    parser.ingest_block(&genesis).unwrap();
    parser.ingest_block(&next).unwrap();

    let db = parser.database();
    let spent = db.get_output(0, 0).unwrap().unwrap();
    assert_eq!(spent.spending_tx_index, Some(2));
    assert_eq!(spent.spending_input_index, Some(0));

    let inputs = db.get_inputs(2).unwrap();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].spent_tx_index, 0);
    assert_eq!(inputs[0].value, COINBASE_VALUE);

    let outputs = db.get_outputs(2).unwrap();
    assert_eq!(outputs.len(), 5);
    assert_eq!(outputs[0].value, FUND_VALUE);
    assert_eq!(outputs[4].value, COINBASE_VALUE - 4 * FUND_VALUE - FEE);

    let state = parser.state();
    assert_eq!(state.block_count, 2);
    assert_eq!(state.tx_count, 3);
    assert_eq!(state.script_count(EquivAddressType::Pubkey), 2);
    assert_eq!(state.script_count(EquivAddressType::Scripthash), 2);
}

#[test]
fn test_spend_within_same_block() {
    let mut parser = in_memory_parser();
    let first_coinbase = coinbase(0);
    let fund = fund_tx(first_coinbase.compute_txid());
    let block = make_block(BlockHash::all_zeros(), 0, vec![first_coinbase, fund]);

    let stats = parser.ingest_block(&block).unwrap();
    assert_eq!(stats.transactions, 2);
    assert_eq!(stats.inputs, 1);
    assert_eq!(
        parser.database().get_output(0, 0).unwrap().unwrap().spending_tx_index,
        Some(1)
    );
}
