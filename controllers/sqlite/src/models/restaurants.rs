// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::restaurants;
use common_macros::b_tree_map;
use controller::{Entity, Id, Named};
use std::collections::BTreeMap;

// To query data from the database
#[derive(Debug, Clone, Identifiable, Queryable, PartialEq)]
#[table_name = "restaurants"]
pub struct Restaurant {
    pub id: Id,
    pub name: String,
}

impl Entity for Restaurant {
    fn get_id(&self) -> Id {
        self.id
    }

    fn get_data(&self) -> BTreeMap<String, String> {
        b_tree_map! {
            "name".into() => self.name.clone(),
        }
    }
}

impl Named for Restaurant {
    fn name(&self) -> &str {
        &self.name
    }
}

// To insert a new restaurant into the database
#[derive(Debug, Clone, Insertable)]
#[table_name = "restaurants"]
pub struct NewRestaurant<'a> {
    pub name: &'a str,
}
