use bigdecimal::BigDecimal;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One unspent output as reported by a chain source, normalized to whole coin
/// units and an absolute block height.
///
/// Equality and hashing cover all five fields, so records built by different
/// sources compare equal exactly when the sources agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Utxo {
    txid: String,
    vout: u32,
    value: BigDecimal,
    address: String,
    block: u64,
}

impl Utxo {
    pub fn new(txid: String, vout: u32, value: BigDecimal, address: String, block: u64) -> Self {
        Self {
            txid,
            vout,
            // 1.5 and 1.50000000 must be the same record
            value: value.normalized(),
            address,
            block,
        }
    }

    pub fn txid(&self) -> &str {
        &self.txid
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }

    pub fn value(&self) -> &BigDecimal {
        &self.value
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn block(&self) -> u64 {
        self.block
    }
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{address: {}, txid: {}, vout: {}, value: {}, block: {}}}",
            self.address, self.txid, self.vout, self.value, self.block
        )
    }
}

pub type UtxoSet = HashSet<Utxo>;

/// Sorts by (block, txid, vout). Records sharing that key differ only in
/// address or value, those fields break the tie so the order is total.
pub fn sort_utxos(utxos: &mut [Utxo]) {
    utxos.sort_by(|a, b| {
        a.block
            .cmp(&b.block)
            .then_with(|| a.txid.cmp(&b.txid))
            .then_with(|| a.vout.cmp(&b.vout))
            .then_with(|| a.address.cmp(&b.address))
            .then_with(|| a.value.cmp(&b.value))
    });
}

pub fn sorted_utxos(utxos: &UtxoSet) -> Vec<Utxo> {
    let mut list: Vec<Utxo> = utxos.iter().cloned().collect();
    sort_utxos(&mut list);
    list
}
