//! The server-side store: one table per synchronized entity.

use crate::corbeille::CorbeilleRecord;
use crate::entity::{
    AuditEntry, ClotureCaisse, CreditVirtuel, CurrencyRate, DepotClient, DocumentHeader, Operation,
    Sim, SimMovement, SyncEntity, VirtualTransaction,
};
use crate::error::CoreResult;
use crate::table::{Table, TableTxn};
use parking_lot::RwLock;

/// Maps an entity type to its table within the [`Store`].
///
/// Generic store operations ([`Store::read`], [`Store::write`]) are written
/// once against this trait and dispatch statically per entity.
pub trait HasTable<T: SyncEntity> {
    /// The lock guarding this entity's table.
    fn table(&self) -> &RwLock<Table<T>>;
}

/// All synchronized state, one [`Table`] per entity behind its own lock.
///
/// Readers of different entities never contend; a write transaction takes
/// only the lock(s) of the tables it touches. When a transaction spans two
/// tables ([`Store::write_pair`]), locks are acquired in type-parameter
/// order; every caller pairing the same two entities must list them in the
/// same order.
#[derive(Debug, Default)]
pub struct Store {
    sims: RwLock<Table<Sim>>,
    virtual_transactions: RwLock<Table<VirtualTransaction>>,
    virtual_transactions_corbeille: RwLock<Table<CorbeilleRecord>>,
    operations: RwLock<Table<Operation>>,
    credits_virtuels: RwLock<Table<CreditVirtuel>>,
    clotures_caisse: RwLock<Table<ClotureCaisse>>,
    currency_rates: RwLock<Table<CurrencyRate>>,
    document_headers: RwLock<Table<DocumentHeader>>,
    sim_movements: RwLock<Table<SimMovement>>,
    depot_clients: RwLock<Table<DepotClient>>,
    audit_log: RwLock<Table<AuditEntry>>,
}

macro_rules! has_table {
    ($field:ident => $ty:ty) => {
        impl HasTable<$ty> for Store {
            fn table(&self) -> &RwLock<Table<$ty>> {
                &self.$field
            }
        }
    };
}

has_table!(sims => Sim);
has_table!(virtual_transactions => VirtualTransaction);
has_table!(virtual_transactions_corbeille => CorbeilleRecord);
has_table!(operations => Operation);
has_table!(credits_virtuels => CreditVirtuel);
has_table!(clotures_caisse => ClotureCaisse);
has_table!(currency_rates => CurrencyRate);
has_table!(document_headers => DocumentHeader);
has_table!(sim_movements => SimMovement);
has_table!(depot_clients => DepotClient);
has_table!(audit_log => AuditEntry);

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with shared access to the entity's table.
    pub fn read<T, R>(&self, f: impl FnOnce(&Table<T>) -> R) -> R
    where
        T: SyncEntity,
        Self: HasTable<T>,
    {
        let guard = HasTable::<T>::table(self).read();
        f(&guard)
    }

    /// Clones the row under `key`, if present.
    pub fn get<T>(&self, key: &T::Key) -> Option<T>
    where
        T: SyncEntity,
        Self: HasTable<T>,
    {
        self.read(|table: &Table<T>| table.get(key).cloned())
    }

    /// Snapshot of every row of the entity.
    pub fn snapshot<T>(&self) -> Vec<T>
    where
        T: SyncEntity,
        Self: HasTable<T>,
    {
        self.read(|table: &Table<T>| table.scan())
    }

    /// Runs `f` inside a write transaction on the entity's table.
    ///
    /// Commits when `f` returns `Ok`, rolls back every journaled write when
    /// it returns `Err`.
    pub fn write<T, R>(&self, f: impl FnOnce(&mut TableTxn<'_, T>) -> CoreResult<R>) -> CoreResult<R>
    where
        T: SyncEntity,
        Self: HasTable<T>,
    {
        let mut guard = HasTable::<T>::table(self).write();
        let mut txn = TableTxn::new(&mut guard);
        match f(&mut txn) {
            Ok(value) => {
                txn.commit();
                Ok(value)
            }
            Err(err) => {
                txn.rollback();
                Err(err)
            }
        }
    }

    /// Runs `f` inside a write transaction spanning two tables.
    ///
    /// Both tables commit or both roll back. Used for operations whose
    /// invariant lives across tables, like moving a transaction between the
    /// active table and the corbeille.
    pub fn write_pair<A, B, R>(
        &self,
        f: impl FnOnce(&mut TableTxn<'_, A>, &mut TableTxn<'_, B>) -> CoreResult<R>,
    ) -> CoreResult<R>
    where
        A: SyncEntity,
        B: SyncEntity,
        Self: HasTable<A> + HasTable<B>,
    {
        let mut guard_a = HasTable::<A>::table(self).write();
        let mut guard_b = HasTable::<B>::table(self).write();
        let mut txn_a = TableTxn::new(&mut guard_a);
        let mut txn_b = TableTxn::new(&mut guard_b);
        match f(&mut txn_a, &mut txn_b) {
            Ok(value) => {
                txn_a.commit();
                txn_b.commit();
                Ok(value)
            }
            Err(err) => {
                txn_a.rollback();
                txn_b.rollback();
                Err(err)
            }
        }
    }

    /// Row counts per table.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sims: self.sims.read().len(),
            virtual_transactions: self.virtual_transactions.read().len(),
            virtual_transactions_corbeille: self.virtual_transactions_corbeille.read().len(),
            operations: self.operations.read().len(),
            credits_virtuels: self.credits_virtuels.read().len(),
            clotures_caisse: self.clotures_caisse.read().len(),
            currency_rates: self.currency_rates.read().len(),
            document_headers: self.document_headers.read().len(),
            sim_movements: self.sim_movements.read().len(),
            depot_clients: self.depot_clients.read().len(),
            audit_log: self.audit_log.read().len(),
        }
    }
}

/// Row counts per table, for logging and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Rows in `sims`.
    pub sims: usize,
    /// Rows in `virtual_transactions`.
    pub virtual_transactions: usize,
    /// Rows in `virtual_transactions_corbeille`.
    pub virtual_transactions_corbeille: usize,
    /// Rows in `operations`.
    pub operations: usize,
    /// Rows in `credits_virtuels`.
    pub credits_virtuels: usize,
    /// Rows in `clotures_caisse`.
    pub clotures_caisse: usize,
    /// Rows in `currency_rates`.
    pub currency_rates: usize,
    /// Rows in `document_headers`.
    pub document_headers: usize,
    /// Rows in `sim_movements`.
    pub sim_movements: usize,
    /// Rows in `depot_clients`.
    pub depot_clients: usize,
    /// Rows in `audit_log`.
    pub audit_log: usize,
}

impl StoreStats {
    /// Total rows across all tables.
    pub fn total(&self) -> usize {
        self.sims
            + self.virtual_transactions
            + self.virtual_transactions_corbeille
            + self.operations
            + self.credits_virtuels
            + self.clotures_caisse
            + self.currency_rates
            + self.document_headers
            + self.sim_movements
            + self.depot_clients
            + self.audit_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::timestamp;

    fn transaction(reference: &str) -> VirtualTransaction {
        serde_json::from_value(serde_json::json!({
            "reference": reference,
            "montant_virtuel": 50.0,
            "montant_cash": 50.0,
            "sim_numero": "+243700000001",
            "shop_id": 1,
            "agent_id": 7,
            "last_modified_at": "2024-02-01 08:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn write_commits_on_ok() {
        let store = Store::new();
        store
            .write(|txn: &mut TableTxn<'_, VirtualTransaction>| txn.insert(transaction("VT-1")))
            .unwrap();

        assert_eq!(store.stats().virtual_transactions, 1);
        assert!(store.get::<VirtualTransaction>(&"VT-1".to_string()).is_some());
    }

    #[test]
    fn write_rolls_back_on_err() {
        let store = Store::new();
        let result: CoreResult<()> = store.write(|txn: &mut TableTxn<'_, VirtualTransaction>| {
            txn.insert(transaction("VT-1"))?;
            Err(CoreError::validation("boom"))
        });

        assert!(result.is_err());
        assert_eq!(store.stats().virtual_transactions, 0);
    }

    #[test]
    fn write_pair_is_atomic() {
        let store = Store::new();
        store
            .write(|txn: &mut TableTxn<'_, VirtualTransaction>| txn.insert(transaction("VT-1")))
            .unwrap();

        // Move the row into the corbeille, then fail: both tables revert.
        let when = timestamp::parse("2024-02-02 09:00:00").unwrap();
        let result: CoreResult<()> = store.write_pair(
            |active: &mut TableTxn<'_, VirtualTransaction>,
             bin: &mut TableTxn<'_, CorbeilleRecord>| {
                let row = active
                    .remove(&"VT-1".to_string())
                    .ok_or_else(|| CoreError::not_found("virtual_transactions", "VT-1"))?;
                bin.insert(CorbeilleRecord::from_active(row, None, None, when, None))?;
                Err(CoreError::validation("boom"))
            },
        );

        assert!(result.is_err());
        let stats = store.stats();
        assert_eq!(stats.virtual_transactions, 1);
        assert_eq!(stats.virtual_transactions_corbeille, 0);
    }
}
