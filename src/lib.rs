//! rowtable - Row-Major Tabular Data Engine
//!
//! An in-memory, row-major table: ordered rows sharing one mutable header
//! index, with structural column mutation, stable multi-key sorting,
//! grouping, contiguous-run scanning, and record projections. Rows with
//! uneven widths are tolerated everywhere except the fixed-field record
//! projection.

pub mod accessor;
pub mod error;
pub mod headers;
pub mod row;
pub mod table;
mod validate;
pub mod value;

pub use accessor::{Accessor, Key, KeySpec};
pub use error::{Result, TableError};
pub use headers::{ColumnRef, Headers};
pub use row::Row;
pub use table::{
    ColumnSpec, GroupNode, Record, Run, Runs, SortKey, SortOrder, Table,
};
pub use validate::RESERVED_NAMES;
pub use value::Value;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::row;

    #[test]
    fn test_complete_workflow() {
        // Load a small sales ledger, reshape it, then report on it.
        let mut table = Table::from_grid(vec![
            row!["product", "region", "quantity", "price"],
            row!["widget", "east", 10, 9.99],
            row!["gadget", "west", 5, 19.99],
            row!["widget", "west", 7, 9.99],
            row!["doohickey", "east", 15, 4.99],
            row!["gadget", "east", 5, 19.99],
        ])
        .unwrap();

        // Structural pass: rename, add a column, fill it.
        table.rename(&[("quantity", "qty")]).unwrap();
        table.append_columns(&["total"]).unwrap();
        for index in 0..table.len() {
            let qty = table.get_value(index, "qty").unwrap().as_float().unwrap();
            let price = table
                .get_value(index, "price")
                .unwrap()
                .as_float()
                .unwrap();
            table
                .set_value(index, "total", Value::Float(qty * price))
                .unwrap();
        }
        assert_eq!(
            table.get_value(0, "total").unwrap(),
            Value::Float(10.0 * 9.99)
        );

        // Sort by region descending, then product ascending; stability
        // keeps equal keys in prior order.
        table
            .sort_by(&[SortKey::descending("region"), SortKey::ascending("product")])
            .unwrap();
        assert_eq!(table.get_value(0, "region").unwrap(), Value::from("west"));
        assert_eq!(table.get_value(0, "product").unwrap(), Value::from("gadget"));

        // Group by region: nested tree with one level.
        let by_region = table.group_rows_append("region").unwrap();
        assert_eq!(by_region.len(), 2);
        let east = by_region.get(&Value::from("east")).unwrap();
        assert_eq!(east.rows().unwrap().len(), 3);

        // Contiguous runs over the sorted region column.
        let runs: Vec<(Key, usize)> = table
            .contiguous("region")
            .unwrap()
            .map(|run| (run.key, run.rows.len()))
            .collect();
        assert_eq!(
            runs,
            vec![
                (Key::One(Value::from("west")), 2),
                (Key::One(Value::from("east")), 3),
            ]
        );

        // Project to records and total up the ledger.
        let records = table.to_records().unwrap();
        let grand_total: f64 = records
            .iter()
            .map(|r| r.get("total").and_then(Value::as_float).unwrap_or(0.0))
            .sum();
        assert!((grand_total - 444.58).abs() < 0.01);
    }

    #[test]
    fn test_single_resolver_for_every_keyed_operation() {
        // A name, a set of names, a position, and a function all drive
        // sort, dedupe, mapping, and runs identically.
        let table = Table::from_grid(vec![
            row!["a", "b"],
            row![1, "x"],
            row![2, "y"],
            row![1, "z"],
        ])
        .unwrap();

        let by_name = table.deduped_by("a").unwrap();
        let by_position = table.deduped_by(0isize).unwrap();
        assert_eq!(by_name.rows(), by_position.rows());
        assert_eq!(by_name.len(), 2);

        let mapped = table.map_rows(vec!["a", "b"]).unwrap();
        assert_eq!(mapped.len(), 3);
        let key = Key::Many(vec![Value::Int(1), Value::from("z")]);
        assert_eq!(mapped.get(&key).unwrap().get("b").unwrap(), Value::from("z"));
    }

    #[test]
    fn test_header_mutation_is_visible_through_held_rows() {
        let mut table = Table::from_grid(vec![row!["x", "y"], row![1, 2]]).unwrap();
        table.rename(&[("x", "renamed")]).unwrap();
        let row = table.get_row(0).unwrap();
        assert_eq!(row.get("renamed").unwrap(), Value::Int(1));
        assert!(matches!(
            row.get("x").unwrap_err(),
            TableError::NameNotFound { .. }
        ));
    }

    #[test]
    fn test_grid_contract_survives_structural_churn() {
        let mut table = Table::from_grid(vec![
            row!["a", "b", "c"],
            row![1, 2, 3],
            row![4, 5, 6],
        ])
        .unwrap();
        table.restructure(&["c", "(d)", "a"]).unwrap();
        table.delete_columns(&["d"]).unwrap();
        table.append_rows(vec![row![9, 8]]).unwrap();

        let rebuilt = Table::from_grid(table.to_grid()).unwrap();
        assert_eq!(rebuilt.names(), vec!["c", "a"]);
        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.get_value(2, "c").unwrap(), Value::Int(9));
    }
}
