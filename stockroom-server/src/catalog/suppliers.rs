//! Supplier Directory

use validator::Validate;

use crate::core::error::{AppError, AppResult};
use crate::db::CatalogStore;
use crate::db::models::{Supplier, SupplierDraft};
use crate::db::storage::SUPPLIER_ID_KEY;

/// Supplier master-data service
#[derive(Clone)]
pub struct SupplierService {
    store: CatalogStore,
}

impl SupplierService {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Create a supplier. Names are unique across the directory.
    pub fn create(&self, draft: SupplierDraft) -> AppResult<Supplier> {
        draft.validate()?;
        if self.store.find_supplier_by_name(&draft.name)?.is_some() {
            return Err(AppError::conflict(format!(
                "Supplier with this name already exists: {}",
                draft.name
            )));
        }

        let txn = self.store.begin_write()?;
        let id = self.store.next_id(&txn, SUPPLIER_ID_KEY)?;
        let supplier = Supplier::new(id, draft);
        self.store.put_supplier(&txn, &supplier)?;
        txn.commit()?;

        tracing::info!(supplier = %supplier.name, id = supplier.id, "Supplier created");
        Ok(supplier)
    }

    /// Replace a supplier's master data. The detected-brand cache is
    /// system-maintained and survives the update untouched.
    pub fn update(&self, id: u64, draft: SupplierDraft) -> AppResult<Supplier> {
        draft.validate()?;
        if let Some(other) = self.store.find_supplier_by_name(&draft.name)?
            && other.id != id
        {
            return Err(AppError::conflict(format!(
                "Supplier with this name already exists: {}",
                draft.name
            )));
        }

        let txn = self.store.begin_write()?;
        let mut supplier = self.store.require_supplier_txn(&txn, id)?;
        supplier.name = draft.name;
        supplier.notes = draft.notes;
        supplier.contacts = draft.contacts;
        supplier.mapping_config = draft.mapping_config;
        supplier.updated_at = shared::now_millis();
        self.store.put_supplier(&txn, &supplier)?;
        txn.commit()?;

        Ok(supplier)
    }

    /// Get one supplier by id
    pub fn get(&self, id: u64) -> AppResult<Supplier> {
        self.store
            .get_supplier(id)?
            .ok_or_else(|| AppError::not_found(format!("Supplier not found: {id}")))
    }

    /// All suppliers in creation order
    pub fn list(&self) -> AppResult<Vec<Supplier>> {
        Ok(self.store.get_all_suppliers()?)
    }
}
