//! Derived lookup of owned key images. Rebuilt from the transaction set; never
//! the source of truth.

use std::collections::HashMap;

use crate::model::{KeyImage, Transaction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedOutput {
    pub amount: u64,
    pub global_index: u64,
}

#[derive(Clone, Debug, Default)]
pub struct KeyImageIndex {
    key_images: Vec<KeyImage>,
    global_indexes: Vec<u64>,
    by_image: HashMap<KeyImage, IndexedOutput>,
}

impl KeyImageIndex {
    pub fn rebuild(transactions: &[Transaction]) -> Self {
        let mut index = Self::default();
        for tx in transactions {
            for out in &tx.outs {
                if let Some(ki) = out.key_image {
                    index.key_images.push(ki);
                    // First owner in ledger order wins on duplicates.
                    index.by_image.entry(ki).or_insert(IndexedOutput {
                        amount: out.amount,
                        global_index: out.global_index,
                    });
                }
                if out.global_index != 0 {
                    index.global_indexes.push(out.global_index);
                }
            }
        }
        index
    }

    /// Key images in ledger order, duplicates kept.
    pub fn key_images(&self) -> &[KeyImage] {
        &self.key_images
    }

    /// Nonzero global indices in ledger order, duplicates kept.
    pub fn global_indexes(&self) -> &[u64] {
        &self.global_indexes
    }

    pub fn lookup(&self, key_image: &KeyImage) -> Option<IndexedOutput> {
        self.by_image.get(key_image).copied()
    }

    pub fn contains(&self, key_image: &KeyImage) -> bool {
        self.by_image.contains_key(key_image)
    }

    pub fn len(&self) -> usize {
        self.key_images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_images.is_empty()
    }
}
