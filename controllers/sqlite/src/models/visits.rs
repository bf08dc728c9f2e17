// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use super::restaurants::Restaurant;
use super::users::User;
use crate::schema::restaurant_visits;
use chrono::NaiveDate;
use common_macros::b_tree_map;
use controller::{Entity, Id, Visit as VisitTrait, VisitRecord};
use std::collections::BTreeMap;

// To query data from the database
#[derive(Debug, Clone, Identifiable, Queryable, Associations, PartialEq)]
#[belongs_to(User)]
#[belongs_to(Restaurant)]
#[table_name = "restaurant_visits"]
pub struct Visit {
    pub id: Id,
    pub user_id: Id,
    pub restaurant_id: Id,
    pub waiting_time_minutes: i32,
    pub staff_rating: i32,
    pub food_rating: i32,
    pub visit_date: NaiveDate,
}

impl Entity for Visit {
    fn get_id(&self) -> Id {
        self.id
    }

    fn get_data(&self) -> BTreeMap<String, String> {
        b_tree_map! {
            "user_id".into() => self.user_id.to_string(),
            "restaurant_id".into() => self.restaurant_id.to_string(),
            "waiting_time_minutes".into() => self.waiting_time_minutes.to_string(),
            "staff_rating".into() => self.staff_rating.to_string(),
            "food_rating".into() => self.food_rating.to_string(),
            "visit_date".into() => self.visit_date.format("%m/%d/%Y").to_string(),
        }
    }
}

impl VisitTrait for Visit {
    fn user_id(&self) -> Id {
        self.user_id
    }

    fn restaurant_id(&self) -> Id {
        self.restaurant_id
    }

    fn waiting_time_minutes(&self) -> i32 {
        self.waiting_time_minutes
    }

    fn staff_rating(&self) -> i32 {
        self.staff_rating
    }

    fn food_rating(&self) -> i32 {
        self.food_rating
    }

    fn visit_date(&self) -> NaiveDate {
        self.visit_date
    }
}

// To insert a new visit into the database
#[derive(Debug, Clone, Insertable)]
#[table_name = "restaurant_visits"]
pub struct NewVisit {
    pub user_id: Id,
    pub restaurant_id: Id,
    pub waiting_time_minutes: i32,
    pub staff_rating: i32,
    pub food_rating: i32,
    pub visit_date: NaiveDate,
}

impl From<&VisitRecord> for NewVisit {
    fn from(record: &VisitRecord) -> Self {
        Self {
            user_id: record.user_id,
            restaurant_id: record.restaurant_id,
            waiting_time_minutes: record.waiting_time_minutes,
            staff_rating: record.staff_rating,
            food_rating: record.food_rating,
            visit_date: record.visit_date,
        }
    }
}
