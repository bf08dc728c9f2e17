// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::Id;
use chrono::NaiveDate;
use prettytable::{format::consts::FORMAT_NO_LINESEP, Cell, Row, Table};
use std::collections::BTreeMap;

pub trait Entity {
    fn get_id(&self) -> Id;
    fn get_data(&self) -> BTreeMap<String, String> {
        Default::default()
    }
}

/// Users, restaurants and groups: an id and a unique name.
pub trait Named: Entity {
    fn name(&self) -> &str;
}

/// A single recorded visit of one user to one restaurant.
pub trait Visit: Entity {
    fn user_id(&self) -> Id;
    fn restaurant_id(&self) -> Id;
    fn waiting_time_minutes(&self) -> i32;
    fn staff_rating(&self) -> i32;
    fn food_rating(&self) -> i32;
    fn visit_date(&self) -> NaiveDate;
}

pub trait ToTable {
    fn to_table(&self) -> Table;
}

impl<E: Entity> ToTable for [E] {
    fn to_table(&self) -> Table {
        let mut table = Table::new();

        if let Some(first) = self.first() {
            let mut titles = Row::new(vec![Cell::new("id")]);
            for key in first.get_data().keys() {
                titles.add_cell(Cell::new(key));
            }
            table.set_titles(titles);
        }

        for entity in self {
            let mut row = Row::new(vec![Cell::new(&entity.get_id().to_string())]);
            for val in entity.get_data().values() {
                row.add_cell(Cell::new(val));
            }
            table.add_row(row);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(Id, &'static str);

    impl Entity for Dummy {
        fn get_id(&self) -> Id {
            self.0
        }

        fn get_data(&self) -> BTreeMap<String, String> {
            let mut data = BTreeMap::new();
            data.insert("name".into(), self.1.into());
            data
        }
    }

    #[test]
    fn table_has_one_row_per_entity() {
        let rows = vec![Dummy(1, "Amano"), Dummy(2, "Chili's")];
        let table = rows.to_table();

        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("Amano"));
        assert!(rendered.contains("Chili's"));
    }

    #[test]
    fn empty_table() {
        let rows: Vec<Dummy> = Vec::new();
        assert!(rows.to_table().is_empty());
    }
}
