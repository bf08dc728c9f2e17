// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::{restaurant_groups, user_groups};
use controller::Id;

// Membership rows carry no data of their own, reads select the id columns
#[derive(Debug, Clone, Copy, Insertable)]
#[table_name = "user_groups"]
pub struct NewUserGroup {
    pub user_id: Id,
    pub group_id: Id,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[table_name = "restaurant_groups"]
pub struct NewRestaurantGroup {
    pub restaurant_id: Id,
    pub group_id: Id,
}
