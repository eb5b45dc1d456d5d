use redb::{ReadableTable, ReadableTableMetadata, TableDefinition, TableError};
use crate::core::error::Result;

/// Every table maps raw byte keys to raw byte values. Nested buckets are
/// expressed as NUL-joined key prefixes inside one table.
pub type Definition<'a> = TableDefinition<'a, &'static [u8], &'static [u8]>;

pub const SEPARATOR: u8 = 0;

pub fn definition(table: &str) -> Definition<'_> {
    TableDefinition::new(table)
}

/// `segment` followed by the separator: the prefix of every key nested under it.
pub fn prefix(segment: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(segment.len() + 1);
    out.extend_from_slice(segment);
    out.push(SEPARATOR);
    out
}

/// `prefix(segment)` with `rest` appended.
pub fn nested(segment: &[u8], rest: &[u8]) -> Vec<u8> {
    let mut out = prefix(segment);
    out.extend_from_slice(rest);
    out
}

fn read_value<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
}

fn read_prefix<T>(table: &T, prefix: &[u8], limit: Option<usize>) -> Result<Vec<(Vec<u8>, Vec<u8>)>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let mut out = Vec::new();
    for item in table.range(prefix..)? {
        let (key, value) = item?;
        if !key.value().starts_with(prefix) || limit.is_some_and(|n| out.len() >= n) {
            break;
        }
        out.push((key.value().to_vec(), value.value().to_vec()));
    }
    Ok(out)
}

/// Read access shared by both transaction kinds. A table that was never
/// written reads as empty.
pub trait Tx {
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Entries whose key starts with `prefix`, in key order. The empty
    /// prefix scans the whole table.
    fn scan(&self, table: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    fn first(&self, table: &str, prefix: &[u8]) -> Result<Option<(Vec<u8>, Vec<u8>)>>;

    fn len(&self, table: &str) -> Result<u64>;

    fn contains(&self, table: &str, key: &[u8]) -> Result<bool> {
        Ok(self.get(table, key)?.is_some())
    }
}

/// Read-only transaction over a committed snapshot.
pub struct ReadTx {
    txn: redb::ReadTransaction,
}

impl ReadTx {
    pub(crate) fn new(txn: redb::ReadTransaction) -> Self {
        ReadTx { txn }
    }

    fn table(&self, table: &str) -> Result<Option<redb::ReadOnlyTable<&'static [u8], &'static [u8]>>> {
        match self.txn.open_table(definition(table)) {
            Ok(opened) => Ok(Some(opened)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl Tx for ReadTx {
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.table(table)? {
            Some(opened) => read_value(&opened, key),
            None => Ok(None),
        }
    }

    fn scan(&self, table: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        match self.table(table)? {
            Some(opened) => read_prefix(&opened, prefix, None),
            None => Ok(Vec::new()),
        }
    }

    fn first(&self, table: &str, prefix: &[u8]) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        match self.table(table)? {
            Some(opened) => Ok(read_prefix(&opened, prefix, Some(1))?.pop()),
            None => Ok(None),
        }
    }

    fn len(&self, table: &str) -> Result<u64> {
        match self.table(table)? {
            Some(opened) => Ok(opened.len()?),
            None => Ok(0),
        }
    }
}

/// Read-write transaction. Nothing it does is visible to others until the
/// store commits it; dropping it unfinished aborts it.
pub struct WriteTx {
    txn: redb::WriteTransaction,
}

impl WriteTx {
    pub(crate) fn new(txn: redb::WriteTransaction) -> Self {
        WriteTx { txn }
    }

    pub(crate) fn into_inner(self) -> redb::WriteTransaction {
        self.txn
    }

    pub fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut opened = self.txn.open_table(definition(table))?;
        opened.insert(key, value)?;
        Ok(())
    }

    /// Removes one entry. Returns whether it existed.
    pub fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool> {
        let mut opened = self.txn.open_table(definition(table))?;
        let removed = opened.remove(key)?.is_some();
        Ok(removed)
    }

    /// Drops a whole table. Returns whether it existed.
    pub fn clear(&mut self, table: &str) -> Result<bool> {
        Ok(self.txn.delete_table(definition(table))?)
    }
}

impl Tx for WriteTx {
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let opened = self.txn.open_table(definition(table))?;
        read_value(&opened, key)
    }

    fn scan(&self, table: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let opened = self.txn.open_table(definition(table))?;
        read_prefix(&opened, prefix, None)
    }

    fn first(&self, table: &str, prefix: &[u8]) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        let opened = self.txn.open_table(definition(table))?;
        Ok(read_prefix(&opened, prefix, Some(1))?.pop())
    }

    fn len(&self, table: &str) -> Result<u64> {
        let opened = self.txn.open_table(definition(table))?;
        Ok(opened.len()?)
    }
}
