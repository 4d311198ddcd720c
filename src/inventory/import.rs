// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spreadsheet import.
//!
//! Every row is validated before the first insert, so a malformed sheet
//! changes nothing. Insertion itself is row by row: a storage failure
//! midway leaves the earlier rows in place and is reported as
//! [`ServiceError::PartialImport`].

use std::collections::BTreeMap;

use crate::crypto::FieldCipher;
use crate::error::ServiceError;
use crate::models::{Cell, ImportBatch, ItemFields, Quantity};
use crate::storage::{InventoryDatabase, StorageError};

use super::allocator::{IdAllocator, MaxIdAllocator};
use super::store::InventoryStore;

/// Columns every sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Name", "Quantity", "Cabinet", "Room", "Location"];

/// Quantity recorded for rows that leave it blank.
pub const DEFAULT_QUANTITY: &str = "too many";

const DESCRIPTION_COLUMN: &str = "Description";
const BARCODE_COLUMN: &str = "Barcode";

pub struct BulkImporter<'a, A: IdAllocator = MaxIdAllocator<'a>> {
    store: InventoryStore<'a, A>,
}

impl<'a> BulkImporter<'a> {
    pub fn new(db: &'a InventoryDatabase, cipher: &'a FieldCipher) -> Self {
        Self::from_store(InventoryStore::new(db, cipher))
    }
}

impl<'a, A: IdAllocator> BulkImporter<'a, A> {
    pub fn from_store(store: InventoryStore<'a, A>) -> Self {
        Self { store }
    }

    /// Insert every row of `batch` for `owner_id`. Returns the number inserted.
    pub fn import_rows(&self, owner_id: &str, batch: &ImportBatch) -> Result<usize, ServiceError> {
        check_columns(&batch.columns)?;

        let rows = batch
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| row_fields(index, row))
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Ok(0);
        }

        // Candidates are fixed up front; collisions fall back to the allocator
        let base = self.store.count(owner_id)?;
        let mut inserted = 0usize;
        for (offset, fields) in rows.iter().enumerate() {
            let candidate = base
                .checked_add(offset as u64 + 1)
                .ok_or_else(|| StorageError::Corrupt(format!("id space exhausted for {owner_id}")))?;

            match self.store.insert_with_retry(owner_id, Some(candidate), fields) {
                Ok(id) => {
                    tracing::debug!(owner_id = %owner_id, item_id = id, row = offset, "Row imported");
                    inserted += 1;
                }
                Err(cause) if inserted == 0 => return Err(cause),
                Err(cause) => {
                    tracing::warn!(
                        owner_id = %owner_id,
                        inserted,
                        failed_row = offset,
                        error = %cause,
                        "Import stopped partway"
                    );
                    return Err(ServiceError::PartialImport {
                        inserted,
                        failed_row: offset,
                        cause: Box::new(cause),
                    });
                }
            }
        }

        tracing::info!(owner_id = %owner_id, inserted, "Import complete");
        Ok(inserted)
    }
}

fn check_columns(columns: &[String]) -> Result<(), ServiceError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|column| column == required))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

fn row_fields(index: usize, row: &BTreeMap<String, Cell>) -> Result<ItemFields, ServiceError> {
    let text = |column: &str| row.get(column).and_then(Cell::as_text);

    let fields = ItemFields {
        name: text("Name").unwrap_or_default(),
        description: text(DESCRIPTION_COLUMN),
        quantity: Quantity::Text(text("Quantity").unwrap_or_else(|| DEFAULT_QUANTITY.to_string())),
        cabinet: text("Cabinet").unwrap_or_default(),
        room: text("Room").unwrap_or_default(),
        location: text("Location").unwrap_or_default(),
        barcode: text(BARCODE_COLUMN),
    };

    fields
        .validate()
        .map_err(|reason| ServiceError::Validation(format!("row {index}: {reason}")))?;
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::field_cipher::test_support::test_cipher;
    use crate::error::ErrorKind;
    use crate::inventory::store::test_support::fields;
    use crate::storage::database::test_support::temp_db;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn row(cells: &[(&str, Cell)]) -> BTreeMap<String, Cell> {
        cells
            .iter()
            .map(|(column, cell)| (column.to_string(), cell.clone()))
            .collect()
    }

    fn lab_row(name: &str, quantity: Cell) -> BTreeMap<String, Cell> {
        row(&[
            ("Name", Cell::Text(name.into())),
            ("Quantity", quantity),
            ("Cabinet", Cell::Text("B2".into())),
            ("Room", Cell::Integer(204)),
            ("Location", Cell::Text("drawer".into())),
        ])
    }

    fn full_columns() -> Vec<String> {
        columns(&REQUIRED_COLUMNS)
    }

    #[test]
    fn imports_rows_after_existing_items() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();
        let store = InventoryStore::new(&db, &cipher);
        store.create("owner-a", &fields("Beaker", Quantity::Count(10))).unwrap();

        let batch = ImportBatch {
            columns: full_columns(),
            rows: vec![
                lab_row("Flask", Cell::Integer(3)),
                lab_row("Pipette", Cell::Number(2.5)),
            ],
        };
        let inserted = BulkImporter::new(&db, &cipher).import_rows("owner-a", &batch).unwrap();
        assert_eq!(inserted, 2);

        let items = store.list("owner-a").unwrap();
        let summary: Vec<(u64, &str, &str, &str)> = items
            .iter()
            .map(|item| (item.id, item.name.as_str(), item.quantity.as_str(), item.room.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Beaker", "10", "101"),
                (2, "Flask", "3", "204"),
                (3, "Pipette", "2.5", "204"),
            ]
        );
    }

    #[test]
    fn blank_quantity_becomes_too_many() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();

        let batch = ImportBatch {
            columns: full_columns(),
            rows: vec![
                lab_row("Gloves", Cell::Empty),
                lab_row("Tips", Cell::Text("   ".into())),
            ],
        };
        BulkImporter::new(&db, &cipher).import_rows("owner-a", &batch).unwrap();

        let items = InventoryStore::new(&db, &cipher).list("owner-a").unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.quantity == DEFAULT_QUANTITY));
    }

    #[test]
    fn missing_column_inserts_nothing() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();

        let batch = ImportBatch {
            columns: columns(&["Name", "Quantity", "Cabinet", "Location"]),
            rows: vec![lab_row("Flask", Cell::Integer(1))],
        };
        let err = BulkImporter::new(&db, &cipher)
            .import_rows("owner-a", &batch)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Room"));
        assert!(InventoryStore::new(&db, &cipher).list("owner-a").unwrap().is_empty());
    }

    #[test]
    fn invalid_row_rejects_whole_batch() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();

        let batch = ImportBatch {
            columns: full_columns(),
            rows: vec![lab_row("Flask", Cell::Integer(1)), lab_row(" ", Cell::Integer(1))],
        };
        let err = BulkImporter::new(&db, &cipher)
            .import_rows("owner-a", &batch)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref msg) if msg.starts_with("row 1")));
        assert!(InventoryStore::new(&db, &cipher).list("owner-a").unwrap().is_empty());
    }

    #[test]
    fn optional_columns_are_used_when_present() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();

        let mut with_extras = lab_row("Flask", Cell::Integer(1));
        with_extras.insert("Description".into(), Cell::Text("Erlenmeyer".into()));
        with_extras.insert("Barcode".into(), Cell::Integer(4006381333931));
        with_extras.insert("Supplier".into(), Cell::Text("ignored".into()));

        let mut names = full_columns();
        names.extend(columns(&["Description", "Barcode", "Supplier"]));
        let batch = ImportBatch {
            columns: names,
            rows: vec![with_extras, lab_row("Plain", Cell::Integer(1))],
        };
        BulkImporter::new(&db, &cipher).import_rows("owner-a", &batch).unwrap();

        let items = InventoryStore::new(&db, &cipher).list("owner-a").unwrap();
        assert_eq!(items[0].description.as_deref(), Some("Erlenmeyer"));
        assert_eq!(items[0].barcode.as_deref(), Some("4006381333931"));
        assert_eq!(items[1].description, None);
        assert_eq!(items[1].barcode, None);
    }

    #[test]
    fn gaps_in_existing_ids_fall_back_to_allocator() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();
        let store = InventoryStore::new(&db, &cipher);
        for name in ["a", "b", "c"] {
            store.create("owner-a", &fields(name, Quantity::Count(1))).unwrap();
        }
        store.delete("owner-a", 1).unwrap();

        // Two items left, so the first candidate is 3, which is still taken
        let batch = ImportBatch {
            columns: full_columns(),
            rows: vec![lab_row("d", Cell::Integer(1)), lab_row("e", Cell::Integer(1))],
        };
        assert_eq!(
            BulkImporter::new(&db, &cipher).import_rows("owner-a", &batch).unwrap(),
            2
        );

        let ids: Vec<u64> = store.list("owner-a").unwrap().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[test]
    fn failure_after_first_row_is_partial_import() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();
        let store = InventoryStore::new(&db, &cipher);
        store.update("owner-a", 2, &fields("x", Quantity::Count(1))).unwrap();
        store.update("owner-a", 3, &fields("y", Quantity::Count(1))).unwrap();

        struct Stuck;
        impl IdAllocator for Stuck {
            fn next_id(&self, _owner_id: &str) -> crate::storage::StorageResult<u64> {
                Ok(3)
            }
        }

        // Two items exist: the only candidate is 3, and so is the retry
        let importer = BulkImporter::from_store(InventoryStore::with_allocator(&db, &cipher, Stuck));
        let batch = ImportBatch {
            columns: full_columns(),
            rows: vec![lab_row("first", Cell::Integer(1))],
        };
        let err = importer.import_rows("owner-a", &batch).unwrap_err();
        assert!(matches!(err, ServiceError::IdConflict { id: 3 }));

        // One item left: candidates are 2 (free) then 3 (taken, retry taken)
        store.delete("owner-a", 2).unwrap();
        let batch = ImportBatch {
            columns: full_columns(),
            rows: vec![lab_row("ok", Cell::Integer(1)), lab_row("stuck", Cell::Integer(1))],
        };
        let err = importer.import_rows("owner-a", &batch).unwrap_err();
        match &err {
            ServiceError::PartialImport {
                inserted,
                failed_row,
                cause,
            } => {
                assert_eq!(*inserted, 1);
                assert_eq!(*failed_row, 1);
                assert!(matches!(**cause, ServiceError::IdConflict { id: 3 }));
            }
            other => panic!("expected PartialImport, got {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let names: Vec<String> = store
            .list("owner-a")
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["ok", "y"]);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let (db, _dir) = temp_db();
        let cipher = test_cipher();
        let batch = ImportBatch {
            columns: full_columns(),
            rows: Vec::new(),
        };
        assert_eq!(BulkImporter::new(&db, &cipher).import_rows("owner-a", &batch).unwrap(), 0);
    }
}
