use crate::domain::batch::Batch;
use crate::domain::payment::{BatchId, Payment, PaymentId};
use crate::domain::ports::{LedgerStore, SettlementInstruction, WriteSet};
use crate::error::{EscrowError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for payment records.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for batch records.
pub const CF_BATCHES: &str = "batches";
/// Column Family for the settlement outbox, keyed by instruction key.
pub const CF_SETTLEMENTS: &str = "settlements";

/// A persistent ledger backed by RocksDB.
///
/// Records are JSON-encoded and keyed by their identifier bytes. A commit is a
/// single `WriteBatch` spanning all column families, so it lands entirely or
/// not at all.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBLedger {
    db: Arc<DB>,
}

impl RocksDBLedger {
    /// Opens or creates a RocksDB instance at `path`, creating any missing
    /// column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_PAYMENTS, CF_BATCHES, CF_SETTLEMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| EscrowError::storage(format!("{name} column family not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every value of a column family in key order.
    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl LedgerStore for RocksDBLedger {
    async fn payment(&self, id: &PaymentId) -> Result<Option<Payment>> {
        self.read(CF_PAYMENTS, id.as_str())
    }

    async fn batch(&self, id: &BatchId) -> Result<Option<Batch>> {
        self.read(CF_BATCHES, id.as_str())
    }

    async fn pending_settlements(&self) -> Result<Vec<SettlementInstruction>> {
        self.scan(CF_SETTLEMENTS)
    }

    async fn payments(&self) -> Result<Vec<Payment>> {
        self.scan(CF_PAYMENTS)
    }

    async fn commit(&self, writes: WriteSet) -> Result<()> {
        let payments = self.cf(CF_PAYMENTS)?;
        let batches = self.cf(CF_BATCHES)?;
        let settlements = self.cf(CF_SETTLEMENTS)?;

        let mut batch_write = WriteBatch::default();
        for payment in &writes.payments {
            batch_write.put_cf(payments, payment.id.as_str(), serde_json::to_vec(payment)?);
        }
        for batch in &writes.batches {
            batch_write.put_cf(batches, batch.id.as_str(), serde_json::to_vec(batch)?);
        }
        for instruction in &writes.settlements {
            batch_write.put_cf(settlements, instruction.key(), serde_json::to_vec(instruction)?);
        }
        for key in &writes.settled {
            batch_write.delete_cf(settlements, key);
        }

        self.db.write(batch_write)?;
        Ok(())
    }
}
