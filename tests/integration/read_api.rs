//! Lookups and view navigation over the fixture chain

use crate::common::fixtures::{self, ScriptKind, BLOCK_TIME_BASE, COINBASE_VALUE, FEE};
use crate::common::TestChain;
use blockindex::errors::{AppError, ChainError};
use blockindex::types::AddressType;
use bitcoin::Network;

#[test]
fn test_tx_with_hash_rejects_malformed_txids() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let non_hex = "zz".repeat(32);
    let too_long = "00".repeat(33);
    for bad in ["", "abc", non_hex.as_str(), too_long.as_str()] {
        match fixture.chain.tx_with_hash(bad) {
            Err(AppError::Chain(ChainError::InvalidTxid { .. })) => {}
            other => panic!("{:?} gave {:?}", bad, other.map(|tx| tx.index())),
        }
    }
    Ok(())
}

#[test]
fn test_tx_with_hash_unknown_txid() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let unknown = "ab".repeat(32);
    match fixture.chain.tx_with_hash(&unknown) {
        Err(AppError::Chain(ChainError::TransactionNotFound { txid })) => {
            assert_eq!(txid, unknown)
        }
        other => panic!("unexpected {:?}", other.map(|tx| tx.index())),
    }
    Ok(())
}

#[test]
fn test_tx_with_hash_ignores_case() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let txid = fixture.txid("address-p2sh-spend-0-tx");
    let tx = fixture.chain.tx_with_hash(&txid.to_uppercase())?;
    assert_eq!(tx.hash(), txid);
    assert_eq!(tx.index(), ScriptKind::P2sh.spend_tx_index(0));
    Ok(())
}

#[test]
fn test_tx_index_out_of_range() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    match fixture.chain.tx(18) {
        Err(AppError::Chain(ChainError::TransactionIndexOutOfRange { tx_index: 18 })) => {}
        other => panic!("unexpected {:?}", other.map(|tx| tx.index())),
    }
    assert!(fixture.chain.block(5).is_err());
    Ok(())
}

#[test]
fn test_blocks_and_tip() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let blocks = fixture.chain.blocks()?;
    assert_eq!(blocks.len(), 5);

    let tip = fixture.chain.tip()?.expect("chain has a tip");
    assert_eq!(tip.height(), 4);
    assert_eq!(tip.hash(), fixtures::fixture_blocks()[4].block_hash().to_string());
    assert_eq!(tip.prev_block()?.map(|b| b.height()), Some(3));
    assert_eq!(blocks[0].prev_block()?, None);

    let time = tip.time().expect("valid timestamp");
    assert_eq!(time.timestamp(), (BLOCK_TIME_BASE + 4 * 600) as i64);

    let txes = tip.txes()?;
    assert_eq!(txes.len(), 5);
    assert_eq!(txes[0], tip.coinbase_tx()?);
    assert!(txes.windows(2).all(|w| w[0].index() + 1 == w[1].index()));
    Ok(())
}

#[test]
fn test_coinbase_has_no_inputs() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let coinbase = fixture.chain.tx(0)?;
    assert!(coinbase.is_coinbase());
    assert!(coinbase.inputs()?.is_empty());
    assert_eq!(coinbase.fee()?, 0);
    assert_eq!(coinbase.output_value()?, COINBASE_VALUE);
    assert!(coinbase.to_string().starts_with("Tx(len(txins)=0, len(txouts)=1,"));
    Ok(())
}

#[test]
fn test_fee_and_values() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    for kind in ScriptKind::ALL {
        let tx = fixture.chain.tx(kind.spend_tx_index(1))?;
        assert_eq!(tx.fee()?, FEE);
        assert_eq!(tx.input_value()?, kind.spend_value(0));
        assert_eq!(tx.version(), 2);
        assert_eq!(tx.locktime(), 0);
        assert!(tx.weight() >= tx.size_bytes());
    }
    Ok(())
}

#[test]
fn test_address_encodings_match_bitcoin() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let tx = fixture
        .chain
        .tx_with_hash(&fixture.txid(&ScriptKind::P2wsh.fund_key()))?;
    let outputs = tx.outputs()?;

    for kind in ScriptKind::ALL {
        let expected = bitcoin::Address::from_script(&kind.script(), Network::Regtest)?;
        let address = outputs[match kind {
            ScriptKind::P2pkh => 0,
            ScriptKind::P2sh => 1,
            ScriptKind::P2wpkh => 2,
            ScriptKind::P2wsh => 3,
        }]
        .address()?;
        assert_eq!(address.encoded.as_deref(), Some(expected.to_string().as_str()));

        let found = fixture.chain.address_from_string(&expected.to_string())?;
        assert_eq!(found, address);
    }
    Ok(())
}

#[test]
fn test_address_display() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    let output = fixture.chain.tx(ScriptKind::P2wpkh.spend_tx_index(0))?.output(0)?;
    let address = output.address()?;
    assert_eq!(address.address_type, AddressType::WitnessPubkeyhash);

    let expected = bitcoin::Address::from_script(&ScriptKind::P2wpkh.script(), Network::Regtest)?;
    assert_eq!(
        address.to_string(),
        format!("WitnessPubkeyHashAddress({})", expected)
    );
    assert_eq!(
        output.to_string(),
        format!(
            "TxOut(spending_tx_index={}, address_type=witness_pubkeyhash, value={})",
            ScriptKind::P2wpkh.spend_tx_index(1),
            ScriptKind::P2wpkh.spend_value(0)
        )
    );
    Ok(())
}

#[test]
fn test_unknown_address_string() -> anyhow::Result<()> {
    let fixture = TestChain::new()?;
    match fixture.chain.address_from_string("bcrt1qnotreal") {
        Err(AppError::Chain(ChainError::AddressNotFound { address })) => {
            assert_eq!(address, "bcrt1qnotreal")
        }
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}
