//! Merkle claim tree over the final reward table.
//!
//! Each leaf is `keccak256(address ++ uint256 amount)` (Solidity packed
//! encoding), with the amount in fixed-point token units. Leaves are sorted,
//! every pair is hashed in sorted order, and an odd node at the end of a layer
//! is carried up unchanged. A claimant verifies a proof by folding it with
//! [`hash_pair`], so no left/right flags are needed.

use crate::domain::{decimal_str_to_units, Address, B256, TOKEN_DECIMALS, U256};
use crate::report::RewardTable;
use alloy_primitives::keccak256;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CLAIM_TABLE_HEADER: [&str; 4] = ["address", "reward", "amount", "proof"];

#[derive(Debug, Error)]
pub enum AirdropError {
    #[error("reward {reward} for {address} is not a claimable amount")]
    Amount { address: Address, reward: f64 },
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Leaf committing `amount` units to `address`.
pub fn claim_leaf(address: Address, amount: U256) -> B256 {
    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(address.as_slice());
    packed[20..].copy_from_slice(&amount.to_be_bytes::<32>());
    keccak256(packed)
}

/// Parent of two nodes, independent of their order.
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut cat = [0u8; 64];
    cat[..32].copy_from_slice(lo.as_slice());
    cat[32..].copy_from_slice(hi.as_slice());
    keccak256(cat)
}

/// Check that `proof` links `leaf` to `root`.
pub fn verify_proof(root: &B256, leaf: &B256, proof: &[B256]) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}

/// All layers of a sorted-pair Merkle tree, leaves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimTree {
    layers: Vec<Vec<B256>>,
}

impl ClaimTree {
    pub fn new(mut leaves: Vec<B256>) -> Self {
        leaves.sort();

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|l| l.len() > 1) {
            let next = layer
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    _ => pair[0],
                })
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// Root of the tree; zero for an empty tree.
    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(B256::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    /// Sibling path from `leaf` to the root, or `None` if `leaf` is absent.
    pub fn proof(&self, leaf: &B256) -> Option<Vec<B256>> {
        let mut index = self.layers.first()?.binary_search(leaf).ok()?;

        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = if index % 2 == 1 { index - 1 } else { index + 1 };
            if let Some(node) = layer.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }
        Some(proof)
    }
}

/// One claimable row of the airdrop.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub address: Address,
    pub reward: f64,
    pub amount: U256,
    pub leaf: B256,
    pub proof: Vec<B256>,
}

/// Claims for every reward row, committed to by a single root.
#[derive(Debug, Clone, PartialEq)]
pub struct Airdrop {
    pub root: B256,
    pub claims: Vec<Claim>,
}

impl Airdrop {
    /// Build claims from `table`, taking each reward as rendered in the table
    /// (eight decimal places) and scaling it to token units.
    pub fn from_table(table: &RewardTable) -> Result<Self, AirdropError> {
        let mut entries = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let amount = claim_amount(row.reward).ok_or(AirdropError::Amount {
                address: row.address,
                reward: row.reward,
            })?;
            entries.push((row.address, row.reward, amount, claim_leaf(row.address, amount)));
        }

        let tree = ClaimTree::new(entries.iter().map(|(_, _, _, leaf)| *leaf).collect());
        let claims = entries
            .into_iter()
            .map(|(address, reward, amount, leaf)| Claim {
                address,
                reward,
                amount,
                leaf,
                proof: tree.proof(&leaf).unwrap_or_default(),
            })
            .collect();

        Ok(Self {
            root: tree.root(),
            claims,
        })
    }

    pub fn claim(&self, address: &Address) -> Option<&Claim> {
        self.claims.iter().find(|c| &c.address == address)
    }

    /// Render as CSV, proofs as space-separated hex nodes.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, AirdropError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(CLAIM_TABLE_HEADER)?;
        for claim in &self.claims {
            let proof = claim
                .proof
                .iter()
                .map(|node| node.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writer.write_record([
                claim.address.to_checksum(None),
                format!("{:.8}", claim.reward),
                claim.amount.to_string(),
                proof,
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| AirdropError::Csv(e.into_error().into()))
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), AirdropError> {
        let bytes = self.to_csv_bytes()?;
        std::fs::write(path, bytes).map_err(|source| AirdropError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn claim_amount(reward: f64) -> Option<U256> {
    if !reward.is_finite() || reward < 0.0 {
        return None;
    }
    decimal_str_to_units(&format!("{:.8}", reward), TOKEN_DECIMALS)
}
