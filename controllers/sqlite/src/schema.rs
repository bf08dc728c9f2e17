table! {
    #[sql_name = "User"]
    users (id) {
        #[sql_name = "UserId"]
        id -> BigInt,
        #[sql_name = "UserName"]
        name -> Text,
    }
}

table! {
    #[sql_name = "Restaurant"]
    restaurants (id) {
        #[sql_name = "RestaurantId"]
        id -> BigInt,
        #[sql_name = "RestaurantName"]
        name -> Text,
    }
}

table! {
    #[sql_name = "Group"]
    groups (id) {
        #[sql_name = "GroupId"]
        id -> BigInt,
        #[sql_name = "GroupName"]
        name -> Text,
    }
}

table! {
    #[sql_name = "UserGroup"]
    user_groups (user_id, group_id) {
        #[sql_name = "UserId"]
        user_id -> BigInt,
        #[sql_name = "GroupId"]
        group_id -> BigInt,
    }
}

table! {
    #[sql_name = "RestaurantGroup"]
    restaurant_groups (restaurant_id, group_id) {
        #[sql_name = "RestaurantId"]
        restaurant_id -> BigInt,
        #[sql_name = "GroupId"]
        group_id -> BigInt,
    }
}

table! {
    #[sql_name = "RestaurantVisit"]
    restaurant_visits (id) {
        #[sql_name = "RestaurantVisitId"]
        id -> BigInt,
        #[sql_name = "UserId"]
        user_id -> BigInt,
        #[sql_name = "RestaurantId"]
        restaurant_id -> BigInt,
        #[sql_name = "WaitingTimeMinutes"]
        waiting_time_minutes -> Integer,
        #[sql_name = "StaffRating"]
        staff_rating -> Integer,
        #[sql_name = "FoodRating"]
        food_rating -> Integer,
        #[sql_name = "VisitDate"]
        visit_date -> Date,
    }
}

joinable!(user_groups -> users (user_id));
joinable!(user_groups -> groups (group_id));
joinable!(restaurant_groups -> restaurants (restaurant_id));
joinable!(restaurant_groups -> groups (group_id));
joinable!(restaurant_visits -> users (user_id));
joinable!(restaurant_visits -> restaurants (restaurant_id));

allow_tables_to_appear_in_same_query!(
    users,
    restaurants,
    groups,
    user_groups,
    restaurant_groups,
    restaurant_visits,
);
