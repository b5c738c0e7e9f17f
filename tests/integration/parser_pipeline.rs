//! Block ingestion end to end: numbering, spends, rollback on bad blocks

use crate::common::fixtures::{self, make_block, payee_script, spend, ScriptKind};
use crate::common::{empty_data_dir, fixture_blocks, TestChain};
use blockindex::database::ChainReadOperations;
use blockindex::errors::{AppError, ChainError};
use blockindex::parser::{ChainParser, FileBlockSource};
use blockindex::types::{AddressType, EquivAddressType};
use bitcoin::consensus::encode::serialize_hex;
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, Network, OutPoint, Txid};
use std::io::Write;

fn chain_error(err: AppError) -> ChainError {
    match err {
        AppError::Chain(e) => e,
        other => panic!("expected a chain error, got {}", other),
    }
}

#[test]
fn test_chain_state_after_full_ingest() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let state = fixture.chain.state()?;

    assert_eq!(state.block_count, 5);
    assert_eq!(state.tx_count, 18);
    // miner, shared key hash, and 12 payees
    assert_eq!(state.script_count(EquivAddressType::Pubkey), 14);
    assert_eq!(state.script_count(EquivAddressType::Scripthash), 2);
    assert_eq!(state.script_count(EquivAddressType::Nulldata), 1);
    assert_eq!(state.script_count(EquivAddressType::Multisig), 0);
    Ok(())
}

#[test]
fn test_ingest_stats() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;

    let stats = parser.ingest_blocks(fixture_blocks().into_iter().map(Ok), None)?;
    assert_eq!(stats.blocks, 5);
    assert_eq!(stats.transactions, 18);
    // fund + 12 spends, one input each
    assert_eq!(stats.inputs, 13);
    // 5 coinbase + 5 fund + 12 spends * 2 + OP_RETURN
    assert_eq!(stats.outputs, 35);
    assert_eq!(stats.new_scripts, 17);
    Ok(())
}

#[test]
fn test_max_blocks_limits_ingest() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;

    let stats = parser.ingest_blocks(fixture_blocks().into_iter().map(Ok), Some(2))?;
    assert_eq!(stats.blocks, 2);
    assert_eq!(parser.state().block_count, 2);
    assert_eq!(parser.state().tx_count, 3);
    Ok(())
}

#[test]
fn test_p2pkh_and_p2wpkh_share_script_number() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let fund = fixture
        .chain
        .tx_with_hash(&fixture.txid(&ScriptKind::P2pkh.fund_key()))?;
    let outputs = fund.outputs()?;

    let p2pkh = &outputs[0];
    let p2wpkh = &outputs[2];
    assert_eq!(p2pkh.address_type(), AddressType::Pubkeyhash);
    assert_eq!(p2wpkh.address_type(), AddressType::WitnessPubkeyhash);
    assert_eq!(p2pkh.record().script_num, p2wpkh.record().script_num);

    // Same key, different encodings
    let a = p2pkh.address()?;
    let b = p2wpkh.address()?;
    assert_eq!(a.equiv_type(), b.equiv_type());
    assert_ne!(a.encoded, b.encoded);

    // The P2SH and P2WSH hashes differ, so they get separate numbers
    assert_eq!(outputs[1].record().script_num, 1);
    assert_eq!(outputs[3].record().script_num, 2);
    Ok(())
}

#[test]
fn test_script_numbers_are_dense_and_start_at_one() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let state = fixture.chain.state()?;
    for num in 1..=state.script_count(EquivAddressType::Pubkey) {
        let script = fixture.chain.script(EquivAddressType::Pubkey, num)?;
        assert_eq!(script.script_num, num);
    }
    let miner = fixture.chain.script(EquivAddressType::Pubkey, 1)?;
    assert_eq!(miner.first_tx_index, 0);
    assert_eq!(miner.script_hex, hex::encode(fixtures::p2pkh(fixtures::MINER_KEY_HASH).as_bytes()));
    Ok(())
}

#[test]
fn test_spends_are_linked_both_ways() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    for kind in ScriptKind::ALL {
        for k in 0..2 {
            let tx = fixture.chain.tx(kind.spend_tx_index(k))?;
            let output = tx.output(0)?;
            assert!(output.is_spent());
            assert_eq!(output.spending_tx_index(), Some(kind.spend_tx_index(k + 1)));

            let input = output.spending_input()?.expect("spent output has an input");
            assert_eq!(input.spent_tx_index(), tx.index());
            assert_eq!(input.spent_output()?, output);
            assert_eq!(input.value(), kind.spend_value(k));
            assert_eq!(input.address_type(), output.address_type());
        }
        let last = fixture.chain.tx(kind.spend_tx_index(2))?;
        assert!(!last.output(0)?.is_spent());
        assert_eq!(last.output(0)?.spending_tx()?, None);
    }
    Ok(())
}

#[test]
fn test_disconnected_block_is_rejected() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let blocks = fixture_blocks();
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    parser.ingest_block(&blocks[0])?;

    let err = parser.ingest_block(&blocks[2]).unwrap_err();
    assert!(matches!(chain_error(err), ChainError::Disconnected { .. }));
    assert_eq!(parser.state().block_count, 1);
    assert_eq!(parser.database().get_chain_state()?.block_count, 1);
    Ok(())
}

#[test]
fn test_missing_prevout_rolls_back_block() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let blocks = fixture_blocks();
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    parser.ingest_block(&blocks[0])?;
    let before = parser.state().clone();

    let orphan = spend(
        OutPoint::new(Txid::from_byte_array([0x77; 32]), 0),
        vec![(payee_script(ScriptKind::P2pkh, 9), 1_000)],
    );
    let bad = make_block(blocks[0].block_hash(), 1, vec![fixtures::coinbase(1), orphan]);

    let err = parser.ingest_block(&bad).unwrap_err();
    match chain_error(err) {
        ChainError::MissingPrevout { txid, vout, .. } => {
            assert_eq!(txid, Txid::from_byte_array([0x77; 32]).to_string());
            assert_eq!(vout, 0);
        }
        other => panic!("unexpected error {}", other),
    }

    // Nothing from the failed block survives, including its coinbase
    assert_eq!(parser.state(), &before);
    assert_eq!(parser.database().get_chain_state()?, before);
    assert!(parser.database().get_block(1)?.is_none());
    assert!(parser
        .database()
        .get_tx_by_hash(&bad.txdata[0].compute_txid().to_string())?
        .is_none());

    // The real block still connects afterwards
    parser.ingest_block(&blocks[1])?;
    assert_eq!(parser.state().block_count, 2);
    Ok(())
}

#[test]
fn test_double_spend_is_rejected() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let blocks = fixture_blocks();
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    for block in &blocks[..3] {
        parser.ingest_block(block)?;
    }

    // Spend the p2pkh fund output a second time
    let fund_txid = blocks[1].txdata[1].compute_txid();
    let again = spend(
        OutPoint::new(fund_txid, 0),
        vec![(payee_script(ScriptKind::P2pkh, 9), 1_000)],
    );
    let bad = make_block(blocks[2].block_hash(), 3, vec![fixtures::coinbase(30), again]);

    let err = parser.ingest_block(&bad).unwrap_err();
    assert_eq!(
        chain_error(err),
        ChainError::DoubleSpend {
            txid: fund_txid.to_string(),
            vout: 0,
            spent_by: ScriptKind::P2pkh.spend_tx_index(0),
        }
    );
    assert_eq!(parser.state().block_count, 3);
    Ok(())
}

#[test]
fn test_parser_resumes_from_stored_state() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let blocks = fixture_blocks();
    {
        let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
        for block in &blocks[..2] {
            parser.ingest_block(block)?;
        }
    }

    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    assert_eq!(parser.state().block_count, 2);
    assert_eq!(parser.state().tx_count, 3);
    for block in &blocks[2..] {
        parser.ingest_block(block)?;
    }
    assert_eq!(parser.state().tx_count, 18);
    Ok(())
}

#[test]
fn test_first_block_may_have_any_parent() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    let block = make_block(BlockHash::from_byte_array([0x55; 32]), 0, vec![fixtures::coinbase(0)]);
    parser.ingest_block(&block)?;
    assert_eq!(parser.state().block_count, 1);
    Ok(())
}

#[test]
fn test_file_source_feeds_parser() -> anyhow::Result<()> {
    let (dir, data_dir) = empty_data_dir()?;
    let path = dir.path().join("blocks.hex");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "# fixture chain")?;
    for block in fixture_blocks() {
        writeln!(file, "{}", serialize_hex(&block))?;
        writeln!(file)?;
    }
    drop(file);

    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    let stats = parser.ingest_blocks(FileBlockSource::open(&path)?, None)?;
    assert_eq!(stats.blocks, 5);
    assert_eq!(parser.state().tx_count, 18);
    Ok(())
}

#[test]
fn test_spend_of_output_created_earlier_in_block() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let blocks = fixture_blocks();
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    parser.ingest_block(&blocks[0])?;

    let fund = fixtures::fund_tx(blocks[0].txdata[0].compute_txid());
    let chained = spend(
        OutPoint::new(fund.compute_txid(), 0),
        vec![(payee_script(ScriptKind::P2pkh, 9), 1_000)],
    );
    let block = make_block(
        blocks[0].block_hash(),
        1,
        vec![fixtures::coinbase(1), fund, chained],
    );

    let stats = parser.ingest_block(&block)?;
    assert_eq!(stats.inputs, 2);

    let db = parser.database();
    let fund_output = db.get_output(2, 0)?.expect("fund output stored");
    assert_eq!(fund_output.spending_tx_index, Some(3));
    assert_eq!(fund_output.spending_input_index, Some(0));
    assert_eq!(db.get_inputs(3)?[0].spent_tx_index, 2);
    Ok(())
}

#[test]
fn test_two_inputs_spending_one_prevout_are_rejected() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let blocks = fixture_blocks();
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
    parser.ingest_block(&blocks[0])?;

    let coinbase_txid = blocks[0].txdata[0].compute_txid();
    let mut twice = spend(
        OutPoint::new(coinbase_txid, 0),
        vec![(payee_script(ScriptKind::P2pkh, 9), 1_000)],
    );
    twice.input.push(twice.input[0].clone());
    let bad = make_block(blocks[0].block_hash(), 1, vec![fixtures::coinbase(1), twice]);

    let err = parser.ingest_block(&bad).unwrap_err();
    assert_eq!(
        chain_error(err),
        ChainError::DoubleSpend {
            txid: coinbase_txid.to_string(),
            vout: 0,
            spent_by: 2,
        }
    );
    assert_eq!(parser.state().block_count, 1);
    assert!(!parser.database().get_output(0, 0)?.expect("coinbase output").is_spent());
    Ok(())
}

#[test]
fn test_repeated_coinbase_txid_is_ingested() -> anyhow::Result<()> {
    let (_dir, data_dir) = empty_data_dir()?;
    let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;

    // Two blocks carrying byte-identical coinbases, as at mainnet 91842/91880
    let first = make_block(BlockHash::all_zeros(), 0, vec![fixtures::coinbase(7)]);
    let second = make_block(first.block_hash(), 1, vec![fixtures::coinbase(7)]);
    let txid = first.txdata[0].compute_txid();
    assert_eq!(txid, second.txdata[0].compute_txid());

    parser.ingest_block(&first)?;
    parser.ingest_block(&second)?;
    assert_eq!(parser.state().block_count, 2);
    assert_eq!(parser.state().tx_count, 2);

    // Lookups and spends resolve to the latest occurrence
    let resolved = parser
        .database()
        .get_tx_by_hash(&txid.to_string())?
        .expect("duplicate txid stored");
    assert_eq!(resolved.tx_index, 1);

    let payout = spend(
        OutPoint::new(txid, 0),
        vec![(payee_script(ScriptKind::P2pkh, 9), 1_000)],
    );
    let third = make_block(second.block_hash(), 2, vec![fixtures::coinbase(2), payout]);
    parser.ingest_block(&third)?;

    let db = parser.database();
    assert!(!db.get_output(0, 0)?.expect("first coinbase output").is_spent());
    assert_eq!(db.get_output(1, 0)?.expect("second coinbase output").spending_tx_index, Some(3));
    Ok(())
}
