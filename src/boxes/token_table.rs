use std::collections::HashMap;
use tracing::trace;

use crate::boxes::TokenAmount;
use crate::digest::TokenId;
use crate::error::{CodecError, Result};
use crate::sigma::{SigmaByteReader, SigmaByteWriter};

/// Distinct token ids of one transaction, in first-seen order
///
/// Embedded boxes refer to tokens by their position in this table instead of
/// repeating the 32 byte id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    ids: Vec<TokenId>,
    positions: HashMap<TokenId, u32>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from each output's token list, in output order
    pub fn from_outputs<'a, I>(outputs: I) -> Self
    where
        I: IntoIterator<Item = &'a [TokenAmount]>,
    {
        let mut table = Self::new();
        for assets in outputs {
            for token in assets {
                table.push(token.token_id);
            }
        }
        trace!(distinct = table.len(), "Built token table");
        table
    }

    /// Build a table positionally, keeping repeated ids
    ///
    /// Every index resolves to the id at that position; `index_of` reports
    /// the first one.
    pub fn from_ids(ids: Vec<TokenId>) -> Self {
        let mut positions = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            positions.entry(*id).or_insert(index as u32);
        }
        Self { ids, positions }
    }

    /// Append `id` unless present; returns whether it was added
    fn push(&mut self, id: TokenId) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.ids.len() as u32);
        self.ids.push(id);
        true
    }

    /// Position of a token id in the table
    pub fn index_of(&self, id: &TokenId) -> Result<u32> {
        self.positions
            .get(id)
            .copied()
            .ok_or(CodecError::UnknownToken(*id))
    }

    /// Token id stored at `index`
    pub fn get(&self, index: u64) -> Result<&TokenId> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.ids.get(i))
            .ok_or(CodecError::TokenIndexOutOfRange {
                index,
                len: self.ids.len(),
            })
    }

    pub fn ids(&self) -> &[TokenId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Writes the distinct token count followed by each 32 byte id.
    pub fn write(&self, writer: &mut SigmaByteWriter) {
        writer.write_count(self.ids.len());
        for id in &self.ids {
            writer.write_digest(id);
        }
    }

    /// Reads a wire token table as written, repeats included.
    pub fn read(reader: &mut SigmaByteReader<'_>) -> Result<Self> {
        let ids = reader.read_collection("token ids", |r, _| r.read_digest("token id"))?;
        Ok(Self::from_ids(ids))
    }
}
