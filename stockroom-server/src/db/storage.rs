//! redb-based storage layer for the stockroom catalog
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `sku` | `Product` | Catalog keyed by business SKU |
//! | `suppliers` | `supplier_id` | `Supplier` | Supplier directory |
//! | `purchase_orders` | `order_id` | `PurchaseOrder` | Orders with embedded lines |
//! | `source_files` | `file_id` | `SourceFile` | Uploaded document records |
//! | `sequence_counter` | name | `u64` | Numeric id counters |
//!
//! Values are JSON-serialized; lookups that are not by primary key (barcode,
//! supplier name, duplicate-order detection) are linear scans, which is fine
//! at back-office catalog sizes.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns, the
//! write is on disk and the file is in a consistent state. A transaction
//! dropped without commit leaves no trace, which the receiving flow relies
//! on when it aborts a scan to ask for order disambiguation.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{LineStatus, OrderStatus, Product, PurchaseOrder, SourceFile, Supplier};

/// Table for products: key = sku, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Table for suppliers: key = supplier id, value = JSON-serialized Supplier
const SUPPLIERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("suppliers");

/// Table for purchase orders: key = order id, value = JSON-serialized PurchaseOrder
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("purchase_orders");

/// Table for uploaded source files: key = file id, value = JSON-serialized SourceFile
const SOURCE_FILES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("source_files");

/// Table for id counters: key = counter name, value = last issued id
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

pub const SUPPLIER_ID_KEY: &str = "supplier_id";
pub const ORDER_ID_KEY: &str = "order_id";
pub const SOURCE_FILE_ID_KEY: &str = "source_file_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Supplier not found: {0}")]
    SupplierNotFound(u64),

    #[error("Purchase order not found: {0}")]
    OrderNotFound(u64),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Catalog storage backed by redb
#[derive(Clone)]
pub struct CatalogStore {
    db: Arc<Database>,
}

impl CatalogStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;

        // Create all tables up front so later read transactions never
        // race table creation
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(SUPPLIERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(SOURCE_FILES_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(SUPPLIERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(SOURCE_FILES_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Id Counters ==========

    /// Issue the next id from the named counter (within transaction)
    pub fn next_id(&self, txn: &WriteTransaction, counter: &str) -> StoreResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(counter)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(counter, next)?;
        Ok(next)
    }

    // ========== Product Operations ==========

    /// Insert or replace a product (within transaction)
    pub fn put_product(&self, txn: &WriteTransaction, product: &Product) -> StoreResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.sku.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a product by SKU
    pub fn get_product(&self, sku: &str) -> StoreResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        match table.get(sku)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a product by SKU (within transaction)
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        sku: &str,
    ) -> StoreResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;

        match table.get(sku)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve a scanned code against SKU first, then barcode (within
    /// transaction). Barcode resolution is a scan in key order, so a code
    /// matching several products resolves deterministically.
    pub fn find_product_by_code_txn(
        &self,
        txn: &WriteTransaction,
        code: &str,
    ) -> StoreResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;

        if let Some(value) = table.get(code)? {
            return Ok(Some(serde_json::from_slice(value.value())?));
        }

        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            if !product.barcode.is_empty() && product.barcode == code {
                return Ok(Some(product));
            }
        }

        Ok(None)
    }

    /// Find a product by its internal id (within transaction)
    pub fn find_product_by_id_txn(
        &self,
        txn: &WriteTransaction,
        id: Uuid,
    ) -> StoreResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            if product.id == id {
                return Ok(Some(product));
            }
        }

        Ok(None)
    }

    /// Get all products
    pub fn get_all_products(&self) -> StoreResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            products.push(serde_json::from_slice(value.value())?);
        }

        Ok(products)
    }

    /// Get all products linked to a supplier
    pub fn get_products_for_supplier(&self, supplier_id: u64) -> StoreResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            if product.supplier_id == Some(supplier_id) {
                products.push(product);
            }
        }

        Ok(products)
    }

    /// Remove a product by SKU (within transaction)
    pub fn remove_product(&self, txn: &WriteTransaction, sku: &str) -> StoreResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        table.remove(sku)?;
        Ok(())
    }

    /// Remove every product (within transaction)
    pub fn clear_products(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;

        let mut keys_to_remove: Vec<String> = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            keys_to_remove.push(key.value().to_string());
        }

        for sku in &keys_to_remove {
            table.remove(sku.as_str())?;
        }

        Ok(keys_to_remove.len() as u64)
    }

    // ========== Supplier Operations ==========

    /// Insert or replace a supplier (within transaction)
    pub fn put_supplier(&self, txn: &WriteTransaction, supplier: &Supplier) -> StoreResult<()> {
        let mut table = txn.open_table(SUPPLIERS_TABLE)?;
        let value = serde_json::to_vec(supplier)?;
        table.insert(supplier.id, value.as_slice())?;
        Ok(())
    }

    /// Get a supplier by id
    pub fn get_supplier(&self, id: u64) -> StoreResult<Option<Supplier>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUPPLIERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a supplier by id (within transaction)
    pub fn get_supplier_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StoreResult<Option<Supplier>> {
        let table = txn.open_table(SUPPLIERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a supplier by id, failing when absent (within transaction)
    pub fn require_supplier_txn(&self, txn: &WriteTransaction, id: u64) -> StoreResult<Supplier> {
        self.get_supplier_txn(txn, id)?
            .ok_or(StoreError::SupplierNotFound(id))
    }

    /// Find a supplier by exact name
    pub fn find_supplier_by_name(&self, name: &str) -> StoreResult<Option<Supplier>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUPPLIERS_TABLE)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let supplier: Supplier = serde_json::from_slice(value.value())?;
            if supplier.name == name {
                return Ok(Some(supplier));
            }
        }

        Ok(None)
    }

    /// Get all suppliers
    pub fn get_all_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUPPLIERS_TABLE)?;

        let mut suppliers = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            suppliers.push(serde_json::from_slice(value.value())?);
        }

        Ok(suppliers)
    }

    // ========== Purchase Order Operations ==========

    /// Insert or replace a purchase order (within transaction)
    pub fn put_order(&self, txn: &WriteTransaction, order: &PurchaseOrder) -> StoreResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;
        Ok(())
    }

    /// Get a purchase order by id
    pub fn get_order(&self, id: u64) -> StoreResult<Option<PurchaseOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a purchase order by id (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StoreResult<Option<PurchaseOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a purchase order by id, failing when absent (within transaction)
    pub fn require_order_txn(&self, txn: &WriteTransaction, id: u64) -> StoreResult<PurchaseOrder> {
        self.get_order_txn(txn, id)?
            .ok_or(StoreError::OrderNotFound(id))
    }

    /// Find the order imported from the same supplier and file, if any
    /// (within transaction). This is the duplicate-detection key.
    pub fn find_order_by_source_txn(
        &self,
        txn: &WriteTransaction,
        supplier_name: &str,
        file_name: &str,
    ) -> StoreResult<Option<PurchaseOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let order: PurchaseOrder = serde_json::from_slice(value.value())?;
            if order.supplier_name == supplier_name && order.file_name == file_name {
                return Ok(Some(order));
            }
        }

        Ok(None)
    }

    /// Find orders still open for receiving that contain an unfinished line
    /// for the given SKU (within transaction)
    pub fn find_open_orders_with_sku_txn(
        &self,
        txn: &WriteTransaction,
        sku: &str,
    ) -> StoreResult<Vec<PurchaseOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: PurchaseOrder = serde_json::from_slice(value.value())?;
            if order.status == OrderStatus::Received {
                continue;
            }
            let wants_sku = order.items.iter().any(|line| {
                line.sku == sku && matches!(line.status, LineStatus::Pending | LineStatus::Partial)
            });
            if wants_sku {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    /// Get all purchase orders
    pub fn get_all_orders(&self) -> StoreResult<Vec<PurchaseOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }

        Ok(orders)
    }

    // ========== Source File Operations ==========

    /// Insert or replace a source file record (within transaction)
    pub fn put_source_file(&self, txn: &WriteTransaction, file: &SourceFile) -> StoreResult<()> {
        let mut table = txn.open_table(SOURCE_FILES_TABLE)?;
        let value = serde_json::to_vec(file)?;
        table.insert(file.id, value.as_slice())?;
        Ok(())
    }

    /// Get all source file records
    pub fn get_all_source_files(&self) -> StoreResult<Vec<SourceFile>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SOURCE_FILES_TABLE)?;

        let mut files = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            files.push(serde_json::from_slice(value.value())?);
        }

        Ok(files)
    }

    /// Remove every source file record (within transaction)
    pub fn clear_source_files(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        let mut table = txn.open_table(SOURCE_FILES_TABLE)?;

        let mut keys_to_remove: Vec<u64> = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            keys_to_remove.push(key.value());
        }

        for id in &keys_to_remove {
            table.remove(id)?;
        }

        Ok(keys_to_remove.len() as u64)
    }

    // ========== Statistics ==========

    /// Get row counts across all tables
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let read_txn = self.db.begin_read()?;

        let products_table = read_txn.open_table(PRODUCTS_TABLE)?;
        let suppliers_table = read_txn.open_table(SUPPLIERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;
        let source_files_table = read_txn.open_table(SOURCE_FILES_TABLE)?;

        Ok(StoreStats {
            product_count: products_table.len()?,
            supplier_count: suppliers_table.len()?,
            order_count: orders_table.len()?,
            source_file_count: source_files_table.len()?,
        })
    }
}

/// Row counts per table
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub product_count: u64,
    pub supplier_count: u64,
    pub order_count: u64,
    pub source_file_count: u64,
}
