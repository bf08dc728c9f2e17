// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod entity;
pub mod error;

use anyhow::Error;
use chrono::NaiveDate;
use std::collections::HashSet;

pub use entity::{Entity, Named, ToTable, Visit};
pub use error::{EntityKind, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;
pub type Id = i64;
pub type Ids = HashSet<Id>;

/// Values supplied by the caller when recording a visit.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub user_id: Id,
    pub restaurant_id: Id,
    pub waiting_time_minutes: i32,
    pub staff_rating: i32,
    pub food_rating: i32,
    pub visit_date: NaiveDate,
}

pub trait Controller {
    type User: Named;
    type Restaurant: Named;
    type Group: Named;
    type Visit: Visit;

    /// Get all users
    fn users(&self) -> Result<Vec<Self::User>>;

    /// Check whether a user with this name exists
    fn user_exists(&self, name: &str) -> Result<bool>;

    /// Id of the user with this name, if any
    fn user_id(&self, name: &str) -> Result<Option<Id>>;

    fn user_by_id(&self, id: Id) -> Result<Option<Self::User>>;

    /// Insert a new user, fails with `ErrorKind::UniqueViolation` on a taken name
    fn add_user(&self, name: &str) -> Result<Id>;

    fn rename_user(&self, id: Id, new_name: &str) -> Result<()>;

    /// Delete the user together with its visits and group memberships
    fn delete_user(&self, id: Id) -> Result<()>;

    /// Get all restaurants
    fn restaurants(&self) -> Result<Vec<Self::Restaurant>>;

    fn restaurant_exists(&self, name: &str) -> Result<bool>;

    fn restaurant_id(&self, name: &str) -> Result<Option<Id>>;

    fn restaurant_by_id(&self, id: Id) -> Result<Option<Self::Restaurant>>;

    fn add_restaurant(&self, name: &str) -> Result<Id>;

    fn rename_restaurant(&self, id: Id, new_name: &str) -> Result<()>;

    /// Delete the restaurant together with its visits and group memberships
    fn delete_restaurant(&self, id: Id) -> Result<()>;

    /// Get all groups
    fn groups(&self) -> Result<Vec<Self::Group>>;

    fn group_exists(&self, name: &str) -> Result<bool>;

    fn group_id(&self, name: &str) -> Result<Option<Id>>;

    fn group_by_id(&self, id: Id) -> Result<Option<Self::Group>>;

    fn add_group(&self, name: &str) -> Result<Id>;

    fn rename_group(&self, id: Id, new_name: &str) -> Result<()>;

    /// Delete the group together with all of its user and restaurant memberships
    fn delete_group(&self, id: Id) -> Result<()>;

    /// Add a user to a group, adding an existing membership is a no-op
    fn add_user_to_group(&self, user_id: Id, group_id: Id) -> Result<()>;

    fn remove_user_from_group(&self, user_id: Id, group_id: Id) -> Result<()>;

    fn is_user_member_of(&self, user_id: Id, group_id: Id) -> Result<bool>;

    fn users_in_group(&self, group_id: Id) -> Result<Ids>;

    fn groups_for_user(&self, user_id: Id) -> Result<Ids>;

    /// Add a restaurant to a group, adding an existing membership is a no-op
    fn add_restaurant_to_group(&self, restaurant_id: Id, group_id: Id) -> Result<()>;

    fn remove_restaurant_from_group(&self, restaurant_id: Id, group_id: Id) -> Result<()>;

    fn is_restaurant_member_of(&self, restaurant_id: Id, group_id: Id) -> Result<bool>;

    fn restaurants_in_group(&self, group_id: Id) -> Result<Ids>;

    fn groups_for_restaurant(&self, restaurant_id: Id) -> Result<Ids>;

    /// Append a visit. Wait time and ratings are stored as given, bounds
    /// are the caller's business.
    fn add_visit(&self, visit: &VisitRecord) -> Result<Id>;

    /// Get all visits
    fn visits(&self) -> Result<Vec<Self::Visit>>;

    fn visits_to_restaurant(&self, restaurant_id: Id) -> Result<Vec<Self::Visit>>;

    fn visits_by_user(&self, user_id: Id) -> Result<Vec<Self::Visit>>;

    /// Visits made by any of `users` to any of `restaurants`
    fn visits_by_users_to(&self, users: &Ids, restaurants: &Ids) -> Result<Vec<Self::Visit>>;

    /// Start a transaction, rolling back the one in progress (if any) first
    fn begin_transaction(&self) -> Result<()>;

    /// Commit the current transaction, no-op when none is active
    fn commit_transaction(&self) -> Result<()>;

    /// Roll back the current transaction, no-op when none is active
    fn rollback_transaction(&self) -> Result<()>;

    fn in_transaction(&self) -> bool;
}
