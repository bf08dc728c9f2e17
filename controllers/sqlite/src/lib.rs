// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

#[macro_use]
extern crate diesel;

pub mod models;
pub mod schema;
pub mod setup;

use crate::models::{
    groups::{Group, NewGroup},
    memberships::{NewRestaurantGroup, NewUserGroup},
    restaurants::{NewRestaurant, Restaurant},
    users::{NewUser, User},
    visits::{NewVisit, Visit},
};
use crate::schema::{groups, restaurant_groups, restaurant_visits, restaurants, user_groups, users};
use anyhow::Error;
use controller::{Controller, EntityKind, ErrorKind, Id, Ids, VisitRecord};
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use diesel::{delete, insert_into, insert_or_ignore_into, update};

no_arg_sql_function!(
    last_insert_rowid,
    diesel::sql_types::BigInt,
    "Rowid of the most recent successful insert on this connection"
);

/// Open (or create) the database at `path` and make sure the schema exists.
pub fn establish_connection(path: &str) -> Result<SqliteConnection, Error> {
    let conn = SqliteConnection::establish(path)?;
    setup::enable_foreign_keys(&conn)?;
    setup::create_all_tables(&conn)?;

    log::debug!("Connected to database {}", path);
    Ok(conn)
}

/// Turn constraint failures into `ErrorKind`, anything else passes through as is.
fn classify(err: DieselError, kind: EntityKind, name: &str) -> Error {
    if let DieselError::DatabaseError(db_kind, info) = &err {
        let message = info.message();
        if matches!(db_kind, DatabaseErrorKind::UniqueViolation)
            || message.starts_with("UNIQUE constraint failed")
        {
            return ErrorKind::unique(kind, name).into();
        }
    }

    foreign_key(err)
}

fn foreign_key(err: DieselError) -> Error {
    if let DieselError::DatabaseError(db_kind, info) = &err {
        if matches!(db_kind, DatabaseErrorKind::ForeignKeyViolation)
            || info.message().starts_with("FOREIGN KEY constraint failed")
        {
            return ErrorKind::ForeignKeyViolation(info.message().to_owned()).into();
        }
    }

    err.into()
}

pub struct SqliteController {
    conn: SqliteConnection,
}

impl SqliteController {
    pub fn in_memory() -> Result<Self, Error> {
        Self::with_path(":memory:")
    }

    pub fn with_path(path: &str) -> Result<Self, Error> {
        let conn = establish_connection(path)?;
        Ok(Self { conn })
    }

    fn transaction_manager(&self) -> &AnsiTransactionManager {
        self.conn.transaction_manager()
    }

    fn transaction_depth(&self) -> u32 {
        TransactionManager::<SqliteConnection>::get_transaction_depth(self.transaction_manager())
    }

    fn last_insert_rowid(&self) -> Result<Id, Error> {
        let id = diesel::select(last_insert_rowid).get_result::<Id>(&self.conn)?;
        Ok(id)
    }
}

impl Drop for SqliteController {
    fn drop(&mut self) {
        if self.in_transaction() {
            log::warn!("Closing the database with an open transaction, rolling back");
            if let Err(e) = self.rollback_transaction() {
                log::error!("Rollback on close failed: {}", e);
            }
        }
    }
}

impl Controller for SqliteController {
    type User = User;
    type Restaurant = Restaurant;
    type Group = Group;
    type Visit = Visit;

    fn users(&self) -> Result<Vec<User>, Error> {
        let users = users::table.load::<User>(&self.conn)?;
        Ok(users)
    }

    fn user_exists(&self, name: &str) -> Result<bool, Error> {
        let count: i64 = users::table
            .filter(users::name.eq(name))
            .count()
            .get_result(&self.conn)?;

        Ok(count != 0)
    }

    fn user_id(&self, name: &str) -> Result<Option<Id>, Error> {
        let id = users::table
            .filter(users::name.eq(name))
            .select(users::id)
            .first::<Id>(&self.conn)
            .optional()?;

        Ok(id)
    }

    fn user_by_id(&self, id: Id) -> Result<Option<User>, Error> {
        let user = users::table.find(id).first::<User>(&self.conn).optional()?;
        Ok(user)
    }

    fn add_user(&self, name: &str) -> Result<Id, Error> {
        insert_into(users::table)
            .values(&NewUser { name })
            .execute(&self.conn)
            .map_err(|e| classify(e, EntityKind::User, name))?;

        let id = self.last_insert_rowid()?;
        log::debug!("Added user '{}' with id({})", name, id);
        Ok(id)
    }

    fn rename_user(&self, id: Id, new_name: &str) -> Result<(), Error> {
        update(users::table.find(id))
            .set(users::name.eq(new_name))
            .execute(&self.conn)
            .map_err(|e| classify(e, EntityKind::User, new_name))?;

        Ok(())
    }

    fn delete_user(&self, id: Id) -> Result<(), Error> {
        self.conn.transaction::<_, DieselError, _>(|| {
            let visits = delete(restaurant_visits::table.filter(restaurant_visits::user_id.eq(id)))
                .execute(&self.conn)?;
            let memberships =
                delete(user_groups::table.filter(user_groups::user_id.eq(id))).execute(&self.conn)?;
            let users = delete(users::table.find(id)).execute(&self.conn)?;

            log::debug!(
                "Deleted user id({}): {} row(s), {} visit(s), {} membership(s)",
                id,
                users,
                visits,
                memberships
            );
            Ok(())
        })?;

        Ok(())
    }

    fn restaurants(&self) -> Result<Vec<Restaurant>, Error> {
        let restaurants = restaurants::table.load::<Restaurant>(&self.conn)?;
        Ok(restaurants)
    }

    fn restaurant_exists(&self, name: &str) -> Result<bool, Error> {
        let count: i64 = restaurants::table
            .filter(restaurants::name.eq(name))
            .count()
            .get_result(&self.conn)?;

        Ok(count != 0)
    }

    fn restaurant_id(&self, name: &str) -> Result<Option<Id>, Error> {
        let id = restaurants::table
            .filter(restaurants::name.eq(name))
            .select(restaurants::id)
            .first::<Id>(&self.conn)
            .optional()?;

        Ok(id)
    }

    fn restaurant_by_id(&self, id: Id) -> Result<Option<Restaurant>, Error> {
        let restaurant = restaurants::table
            .find(id)
            .first::<Restaurant>(&self.conn)
            .optional()?;

        Ok(restaurant)
    }

    fn add_restaurant(&self, name: &str) -> Result<Id, Error> {
        insert_into(restaurants::table)
            .values(&NewRestaurant { name })
            .execute(&self.conn)
            .map_err(|e| classify(e, EntityKind::Restaurant, name))?;

        let id = self.last_insert_rowid()?;
        log::debug!("Added restaurant '{}' with id({})", name, id);
        Ok(id)
    }

    fn rename_restaurant(&self, id: Id, new_name: &str) -> Result<(), Error> {
        update(restaurants::table.find(id))
            .set(restaurants::name.eq(new_name))
            .execute(&self.conn)
            .map_err(|e| classify(e, EntityKind::Restaurant, new_name))?;

        Ok(())
    }

    fn delete_restaurant(&self, id: Id) -> Result<(), Error> {
        self.conn.transaction::<_, DieselError, _>(|| {
            let visits = delete(
                restaurant_visits::table.filter(restaurant_visits::restaurant_id.eq(id)),
            )
            .execute(&self.conn)?;
            let memberships = delete(
                restaurant_groups::table.filter(restaurant_groups::restaurant_id.eq(id)),
            )
            .execute(&self.conn)?;
            let restaurants = delete(restaurants::table.find(id)).execute(&self.conn)?;

            log::debug!(
                "Deleted restaurant id({}): {} row(s), {} visit(s), {} membership(s)",
                id,
                restaurants,
                visits,
                memberships
            );
            Ok(())
        })?;

        Ok(())
    }

    fn groups(&self) -> Result<Vec<Group>, Error> {
        let groups = groups::table.load::<Group>(&self.conn)?;
        Ok(groups)
    }

    fn group_exists(&self, name: &str) -> Result<bool, Error> {
        let count: i64 = groups::table
            .filter(groups::name.eq(name))
            .count()
            .get_result(&self.conn)?;

        Ok(count != 0)
    }

    fn group_id(&self, name: &str) -> Result<Option<Id>, Error> {
        let id = groups::table
            .filter(groups::name.eq(name))
            .select(groups::id)
            .first::<Id>(&self.conn)
            .optional()?;

        Ok(id)
    }

    fn group_by_id(&self, id: Id) -> Result<Option<Group>, Error> {
        let group = groups::table.find(id).first::<Group>(&self.conn).optional()?;
        Ok(group)
    }

    fn add_group(&self, name: &str) -> Result<Id, Error> {
        insert_into(groups::table)
            .values(&NewGroup { name })
            .execute(&self.conn)
            .map_err(|e| classify(e, EntityKind::Group, name))?;

        let id = self.last_insert_rowid()?;
        log::debug!("Added group '{}' with id({})", name, id);
        Ok(id)
    }

    fn rename_group(&self, id: Id, new_name: &str) -> Result<(), Error> {
        update(groups::table.find(id))
            .set(groups::name.eq(new_name))
            .execute(&self.conn)
            .map_err(|e| classify(e, EntityKind::Group, new_name))?;

        Ok(())
    }

    fn delete_group(&self, id: Id) -> Result<(), Error> {
        self.conn.transaction::<_, DieselError, _>(|| {
            let users = delete(user_groups::table.filter(user_groups::group_id.eq(id)))
                .execute(&self.conn)?;
            let restaurants =
                delete(restaurant_groups::table.filter(restaurant_groups::group_id.eq(id)))
                    .execute(&self.conn)?;
            let groups = delete(groups::table.find(id)).execute(&self.conn)?;

            log::debug!(
                "Deleted group id({}): {} row(s), {} user(s), {} restaurant(s)",
                id,
                groups,
                users,
                restaurants
            );
            Ok(())
        })?;

        Ok(())
    }

    fn add_user_to_group(&self, user_id: Id, group_id: Id) -> Result<(), Error> {
        insert_or_ignore_into(user_groups::table)
            .values(&NewUserGroup { user_id, group_id })
            .execute(&self.conn)
            .map_err(foreign_key)?;

        Ok(())
    }

    fn remove_user_from_group(&self, user_id: Id, group_id: Id) -> Result<(), Error> {
        delete(
            user_groups::table
                .filter(user_groups::user_id.eq(user_id))
                .filter(user_groups::group_id.eq(group_id)),
        )
        .execute(&self.conn)?;

        Ok(())
    }

    fn is_user_member_of(&self, user_id: Id, group_id: Id) -> Result<bool, Error> {
        let count: i64 = user_groups::table
            .filter(user_groups::user_id.eq(user_id))
            .filter(user_groups::group_id.eq(group_id))
            .count()
            .get_result(&self.conn)?;

        Ok(count != 0)
    }

    fn users_in_group(&self, group_id: Id) -> Result<Ids, Error> {
        let ids = user_groups::table
            .filter(user_groups::group_id.eq(group_id))
            .select(user_groups::user_id)
            .load::<Id>(&self.conn)?;

        Ok(ids.into_iter().collect())
    }

    fn groups_for_user(&self, user_id: Id) -> Result<Ids, Error> {
        let ids = user_groups::table
            .filter(user_groups::user_id.eq(user_id))
            .select(user_groups::group_id)
            .load::<Id>(&self.conn)?;

        Ok(ids.into_iter().collect())
    }

    fn add_restaurant_to_group(&self, restaurant_id: Id, group_id: Id) -> Result<(), Error> {
        insert_or_ignore_into(restaurant_groups::table)
            .values(&NewRestaurantGroup {
                restaurant_id,
                group_id,
            })
            .execute(&self.conn)
            .map_err(foreign_key)?;

        Ok(())
    }

    fn remove_restaurant_from_group(&self, restaurant_id: Id, group_id: Id) -> Result<(), Error> {
        delete(
            restaurant_groups::table
                .filter(restaurant_groups::restaurant_id.eq(restaurant_id))
                .filter(restaurant_groups::group_id.eq(group_id)),
        )
        .execute(&self.conn)?;

        Ok(())
    }

    fn is_restaurant_member_of(&self, restaurant_id: Id, group_id: Id) -> Result<bool, Error> {
        let count: i64 = restaurant_groups::table
            .filter(restaurant_groups::restaurant_id.eq(restaurant_id))
            .filter(restaurant_groups::group_id.eq(group_id))
            .count()
            .get_result(&self.conn)?;

        Ok(count != 0)
    }

    fn restaurants_in_group(&self, group_id: Id) -> Result<Ids, Error> {
        let ids = restaurant_groups::table
            .filter(restaurant_groups::group_id.eq(group_id))
            .select(restaurant_groups::restaurant_id)
            .load::<Id>(&self.conn)?;

        Ok(ids.into_iter().collect())
    }

    fn groups_for_restaurant(&self, restaurant_id: Id) -> Result<Ids, Error> {
        let ids = restaurant_groups::table
            .filter(restaurant_groups::restaurant_id.eq(restaurant_id))
            .select(restaurant_groups::group_id)
            .load::<Id>(&self.conn)?;

        Ok(ids.into_iter().collect())
    }

    fn add_visit(&self, visit: &VisitRecord) -> Result<Id, Error> {
        insert_into(restaurant_visits::table)
            .values(&NewVisit::from(visit))
            .execute(&self.conn)
            .map_err(foreign_key)?;

        self.last_insert_rowid()
    }

    fn visits(&self) -> Result<Vec<Visit>, Error> {
        let visits = restaurant_visits::table.load::<Visit>(&self.conn)?;
        Ok(visits)
    }

    fn visits_to_restaurant(&self, restaurant_id: Id) -> Result<Vec<Visit>, Error> {
        let visits = restaurant_visits::table
            .filter(restaurant_visits::restaurant_id.eq(restaurant_id))
            .load::<Visit>(&self.conn)?;

        Ok(visits)
    }

    fn visits_by_user(&self, user_id: Id) -> Result<Vec<Visit>, Error> {
        let visits = restaurant_visits::table
            .filter(restaurant_visits::user_id.eq(user_id))
            .load::<Visit>(&self.conn)?;

        Ok(visits)
    }

    fn visits_by_users_to(&self, users: &Ids, restaurants: &Ids) -> Result<Vec<Visit>, Error> {
        if users.is_empty() || restaurants.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Id> = users.iter().copied().collect();
        let restaurant_ids: Vec<Id> = restaurants.iter().copied().collect();

        let visits = restaurant_visits::table
            .filter(restaurant_visits::user_id.eq_any(user_ids))
            .filter(restaurant_visits::restaurant_id.eq_any(restaurant_ids))
            .load::<Visit>(&self.conn)?;

        Ok(visits)
    }

    fn begin_transaction(&self) -> Result<(), Error> {
        if self.in_transaction() {
            log::warn!("Transaction already in progress, rolling it back");
            self.rollback_transaction()?;
        }

        self.transaction_manager().begin_transaction(&self.conn)?;
        log::debug!("Transaction started");
        Ok(())
    }

    fn commit_transaction(&self) -> Result<(), Error> {
        if !self.in_transaction() {
            return Ok(());
        }

        self.transaction_manager().commit_transaction(&self.conn)?;
        log::debug!("Transaction committed");
        Ok(())
    }

    fn rollback_transaction(&self) -> Result<(), Error> {
        if !self.in_transaction() {
            return Ok(());
        }

        self.transaction_manager().rollback_transaction(&self.conn)?;
        log::debug!("Transaction rolled back");
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.transaction_depth() > 0
    }
}
