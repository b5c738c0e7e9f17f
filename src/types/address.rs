//! Output script classification and address identity
//!
//! Every output script is classified into an [`AddressType`]. Types whose
//! addresses can be controlled by the same key material are grouped into an
//! [`EquivAddressType`] family, and scripts are numbered densely (from 1)
//! within each family. Deduplication uses a [`ScriptKey`] so that, for example,
//! a P2PKH and a P2WPKH output paying the same key hash share one address number.

use bitcoin::hashes::{hash160, Hash};
use bitcoin::opcodes::all::OP_CHECKMULTISIG;
use bitcoin::script::Instruction;
use bitcoin::{Network, Script};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Script class of an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Nonstandard,
    /// Pay-to-PubKey (legacy)
    Pubkey,
    /// Pay-to-PubKey-Hash
    Pubkeyhash,
    /// Pay-to-Script-Hash
    Scripthash,
    /// Bare M-of-N multisig
    Multisig,
    /// OP_RETURN data carrier
    Nulldata,
    /// Pay-to-Witness-PubKey-Hash (SegWit v0)
    WitnessPubkeyhash,
    /// Pay-to-Witness-Script-Hash (SegWit v0)
    WitnessScripthash,
    /// Witness program with an unassigned version or length
    WitnessUnknown,
    /// Pay-to-Taproot (SegWit v1)
    WitnessTaproot,
}

impl AddressType {
    pub const ALL: [AddressType; 10] = [
        AddressType::Nonstandard,
        AddressType::Pubkey,
        AddressType::Pubkeyhash,
        AddressType::Scripthash,
        AddressType::Multisig,
        AddressType::Nulldata,
        AddressType::WitnessPubkeyhash,
        AddressType::WitnessScripthash,
        AddressType::WitnessUnknown,
        AddressType::WitnessTaproot,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Nonstandard => "nonstandard",
            AddressType::Pubkey => "pubkey",
            AddressType::Pubkeyhash => "pubkeyhash",
            AddressType::Scripthash => "scripthash",
            AddressType::Multisig => "multisig",
            AddressType::Nulldata => "nulldata",
            AddressType::WitnessPubkeyhash => "witness_pubkeyhash",
            AddressType::WitnessScripthash => "witness_scripthash",
            AddressType::WitnessUnknown => "witness_unknown",
            AddressType::WitnessTaproot => "witness_taproot",
        }
    }

    /// Name used when rendering an [`Address`]
    fn address_label(&self) -> &'static str {
        match self {
            AddressType::Nonstandard => "NonStandardAddress",
            AddressType::Pubkey => "PubkeyAddress",
            AddressType::Pubkeyhash => "PubkeyHashAddress",
            AddressType::Scripthash => "ScriptHashAddress",
            AddressType::Multisig => "MultisigAddress",
            AddressType::Nulldata => "OpReturn",
            AddressType::WitnessPubkeyhash => "WitnessPubkeyHashAddress",
            AddressType::WitnessScripthash => "WitnessScriptHashAddress",
            AddressType::WitnessUnknown => "WitnessUnknownAddress",
            AddressType::WitnessTaproot => "TaprootAddress",
        }
    }

    pub fn equiv_type(&self) -> EquivAddressType {
        match self {
            AddressType::Pubkey | AddressType::Pubkeyhash | AddressType::WitnessPubkeyhash => {
                EquivAddressType::Pubkey
            }
            AddressType::Scripthash | AddressType::WitnessScripthash => {
                EquivAddressType::Scripthash
            }
            AddressType::Multisig => EquivAddressType::Multisig,
            AddressType::Nulldata => EquivAddressType::Nulldata,
            AddressType::Nonstandard => EquivAddressType::Nonstandard,
            AddressType::WitnessUnknown => EquivAddressType::WitnessUnknown,
            AddressType::WitnessTaproot => EquivAddressType::WitnessTaproot,
        }
    }

    pub fn is_witness(&self) -> bool {
        matches!(
            self,
            AddressType::WitnessPubkeyhash
                | AddressType::WitnessScripthash
                | AddressType::WitnessUnknown
                | AddressType::WitnessTaproot
        )
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonstandard" => Ok(AddressType::Nonstandard),
            "pubkey" | "p2pk" => Ok(AddressType::Pubkey),
            "pubkeyhash" | "p2pkh" => Ok(AddressType::Pubkeyhash),
            "scripthash" | "p2sh" => Ok(AddressType::Scripthash),
            "multisig" | "p2ms" => Ok(AddressType::Multisig),
            "nulldata" | "op_return" => Ok(AddressType::Nulldata),
            "witness_pubkeyhash" | "p2wpkh" => Ok(AddressType::WitnessPubkeyhash),
            "witness_scripthash" | "p2wsh" => Ok(AddressType::WitnessScripthash),
            "witness_unknown" => Ok(AddressType::WitnessUnknown),
            "witness_taproot" | "p2tr" => Ok(AddressType::WitnessTaproot),
            other => Err(format!("unknown address type: {}", other)),
        }
    }
}

/// Family of address types that share script numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivAddressType {
    Pubkey,
    Scripthash,
    Multisig,
    Nulldata,
    Nonstandard,
    WitnessUnknown,
    WitnessTaproot,
}

impl EquivAddressType {
    pub const ALL: [EquivAddressType; 7] = [
        EquivAddressType::Pubkey,
        EquivAddressType::Scripthash,
        EquivAddressType::Multisig,
        EquivAddressType::Nulldata,
        EquivAddressType::Nonstandard,
        EquivAddressType::WitnessUnknown,
        EquivAddressType::WitnessTaproot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquivAddressType::Pubkey => "pubkey",
            EquivAddressType::Scripthash => "scripthash",
            EquivAddressType::Multisig => "multisig",
            EquivAddressType::Nulldata => "nulldata",
            EquivAddressType::Nonstandard => "nonstandard",
            EquivAddressType::WitnessUnknown => "witness_unknown",
            EquivAddressType::WitnessTaproot => "witness_taproot",
        }
    }

    /// Address types belonging to this family
    pub fn members(&self) -> Vec<AddressType> {
        AddressType::ALL
            .iter()
            .copied()
            .filter(|t| t.equiv_type() == *self)
            .collect()
    }
}

impl fmt::Display for EquivAddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquivAddressType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquivAddressType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown equiv address type: {}", s))
    }
}

/// Deduplication key of an output script within its equiv family
///
/// `None` bytes mean the script is never deduplicated (OP_RETURN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptKey {
    pub equiv_type: EquivAddressType,
    pub bytes: Option<Vec<u8>>,
}

impl ScriptKey {
    pub fn to_hex(&self) -> Option<String> {
        self.bytes.as_ref().map(hex::encode)
    }
}

/// Classify an output script
pub fn classify_script(script: &Script) -> AddressType {
    if script.is_p2pkh() {
        AddressType::Pubkeyhash
    } else if script.is_p2sh() {
        AddressType::Scripthash
    } else if script.is_p2wpkh() {
        AddressType::WitnessPubkeyhash
    } else if script.is_p2wsh() {
        AddressType::WitnessScripthash
    } else if script.is_p2tr() {
        AddressType::WitnessTaproot
    } else if script.is_witness_program() {
        AddressType::WitnessUnknown
    } else if script.is_op_return() {
        AddressType::Nulldata
    } else if p2pk_pubkey(script).is_some() {
        AddressType::Pubkey
    } else if parse_bare_multisig(script).is_some() {
        AddressType::Multisig
    } else {
        AddressType::Nonstandard
    }
}

/// Compute the dedup key for a script already classified as `address_type`
pub fn script_key(script: &Script, address_type: AddressType) -> ScriptKey {
    let bytes = script.as_bytes();
    let key = match address_type {
        AddressType::Pubkeyhash => Some(bytes[3..23].to_vec()),
        AddressType::WitnessPubkeyhash => Some(bytes[2..22].to_vec()),
        AddressType::Pubkey => {
            p2pk_pubkey(script).map(|pk| hash160::Hash::hash(pk).to_byte_array().to_vec())
        }
        AddressType::Scripthash => Some(bytes[2..22].to_vec()),
        AddressType::WitnessScripthash => Some(bytes[2..34].to_vec()),
        AddressType::Nulldata => None,
        AddressType::Multisig
        | AddressType::Nonstandard
        | AddressType::WitnessUnknown
        | AddressType::WitnessTaproot => Some(bytes.to_vec()),
    };
    ScriptKey {
        equiv_type: address_type.equiv_type(),
        bytes: key,
    }
}

/// Human-readable encoding of a script for `network`, where one exists
pub fn encode_address(script: &Script, network: Network) -> Option<String> {
    bitcoin::Address::from_script(script, network)
        .ok()
        .map(|addr| addr.to_string())
}

/// Extract the public key from a `<pubkey> OP_CHECKSIG` script
fn p2pk_pubkey(script: &Script) -> Option<&[u8]> {
    if !script.is_p2pk() {
        return None;
    }
    match script.instructions().next() {
        Some(Ok(Instruction::PushBytes(push))) => Some(push.as_bytes()),
        _ => None,
    }
}

/// Parse `OP_m <pubkey>... OP_n OP_CHECKMULTISIG`, returning (m, n)
pub fn parse_bare_multisig(script: &Script) -> Option<(u8, u8)> {
    let instructions: Vec<Instruction> = script.instructions().collect::<Result<_, _>>().ok()?;
    if instructions.len() < 4 {
        return None;
    }

    let small_int = |ins: &Instruction| match ins {
        Instruction::Op(op) if (0x51..=0x60).contains(&op.to_u8()) => Some(op.to_u8() - 0x50),
        _ => None,
    };

    let last = instructions.len() - 1;
    match instructions[last] {
        Instruction::Op(op) if op == OP_CHECKMULTISIG => {}
        _ => return None,
    }
    let m = small_int(&instructions[0])?;
    let n = small_int(&instructions[last - 1])?;

    let keys = &instructions[1..last - 1];
    let all_pubkeys = keys.iter().all(|ins| match ins {
        Instruction::PushBytes(push) => matches!(push.len(), 33 | 65),
        _ => false,
    });

    if all_pubkeys && keys.len() == n as usize && m <= n {
        Some((m, n))
    } else {
        None
    }
}

/// Indexed address: a numbered script within an equiv family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_type: AddressType,
    pub script_num: u32,
    pub encoded: Option<String>,
}

impl Address {
    pub fn equiv_type(&self) -> EquivAddressType {
        self.address_type.equiv_type()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.address_type.address_label();
        match &self.encoded {
            Some(encoded) => write!(f, "{}({})", label, encoded),
            None => write!(f, "{}(script_num={})", label, self.script_num),
        }
    }
}
