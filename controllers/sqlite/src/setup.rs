// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;

const CREATE_USER_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "User" (
  "UserId" INTEGER PRIMARY KEY,
  "UserName" TEXT NOT NULL UNIQUE
);"#;

const CREATE_RESTAURANT_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "Restaurant" (
  "RestaurantId" INTEGER PRIMARY KEY,
  "RestaurantName" TEXT NOT NULL UNIQUE
);"#;

const CREATE_GROUP_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "Group" (
  "GroupId" INTEGER PRIMARY KEY,
  "GroupName" TEXT NOT NULL UNIQUE
);"#;

const CREATE_USER_GROUP_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "UserGroup" (
  "UserId" INTEGER NOT NULL REFERENCES "User"("UserId") ON DELETE CASCADE,
  "GroupId" INTEGER NOT NULL REFERENCES "Group"("GroupId") ON DELETE CASCADE,
  CONSTRAINT "UserGroup_Key" UNIQUE ("UserId", "GroupId") ON CONFLICT IGNORE
);"#;

const CREATE_RESTAURANT_GROUP_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "RestaurantGroup" (
  "RestaurantId" INTEGER NOT NULL REFERENCES "Restaurant"("RestaurantId") ON DELETE CASCADE,
  "GroupId" INTEGER NOT NULL REFERENCES "Group"("GroupId") ON DELETE CASCADE,
  CONSTRAINT "RestaurantGroup_Key" UNIQUE ("RestaurantId", "GroupId") ON CONFLICT IGNORE
);"#;

const CREATE_RESTAURANT_VISIT_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "RestaurantVisit" (
  "RestaurantVisitId" INTEGER PRIMARY KEY,
  "UserId" INTEGER NOT NULL REFERENCES "User"("UserId") ON DELETE CASCADE,
  "RestaurantId" INTEGER NOT NULL REFERENCES "Restaurant"("RestaurantId") ON DELETE CASCADE,
  "WaitingTimeMinutes" INTEGER NOT NULL,
  "StaffRating" INTEGER NOT NULL,
  "FoodRating" INTEGER NOT NULL,
  "VisitDate" TEXT NOT NULL
);"#;

/// Tables in creation order, parents before children.
const CREATE_TABLES: [&str; 6] = [
    CREATE_USER_TABLE,
    CREATE_RESTAURANT_TABLE,
    CREATE_GROUP_TABLE,
    CREATE_USER_GROUP_TABLE,
    CREATE_RESTAURANT_GROUP_TABLE,
    CREATE_RESTAURANT_VISIT_TABLE,
];

/// Must run outside of a transaction, sqlite ignores the pragma otherwise.
pub fn enable_foreign_keys(conn: &SqliteConnection) -> Result<(), Error> {
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

pub fn create_all_tables(conn: &SqliteConnection) -> Result<(), Error> {
    for statement in CREATE_TABLES.iter() {
        conn.batch_execute(statement)?;
    }

    log::debug!("Ensured {} tables exist", CREATE_TABLES.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;

    #[test]
    fn create_tables_twice() -> Result<(), Error> {
        let conn = SqliteConnection::establish(":memory:")?;
        create_all_tables(&conn)?;
        create_all_tables(&conn)?;

        Ok(())
    }
}
