// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::parser::{Member, Statement, VisitArgs, VisitFilter};
use anyhow::Error;
use chrono::{Local, NaiveDate};
use controller::{Controller, Entity, EntityKind, Id, Named, ToTable, VisitRecord};
use engine::Selector;

fn entity_id<C: Controller>(
    controller: &C,
    kind: EntityKind,
    name: &str,
) -> Result<Option<Id>, Error> {
    match kind {
        EntityKind::User => controller.user_id(name),
        EntityKind::Restaurant => controller.restaurant_id(name),
        EntityKind::Group => controller.group_id(name),
    }
}

fn entity_exists<C: Controller>(
    controller: &C,
    kind: EntityKind,
    name: &str,
) -> Result<bool, Error> {
    match kind {
        EntityKind::User => controller.user_exists(name),
        EntityKind::Restaurant => controller.restaurant_exists(name),
        EntityKind::Group => controller.group_exists(name),
    }
}

fn missing(kind: EntityKind, name: &str) -> String {
    format!("{} '{}' does not exist in the database", kind, name)
}

fn add<C: Controller>(controller: &C, kind: EntityKind, name: &str) -> Result<String, Error> {
    if entity_exists(controller, kind, name)? {
        return Ok(format!("{} '{}' already exists in the database", kind, name));
    }

    let id = match kind {
        EntityKind::User => controller.add_user(name)?,
        EntityKind::Restaurant => controller.add_restaurant(name)?,
        EntityKind::Group => controller.add_group(name)?,
    };
    log::debug!("{} '{}' got id({})", kind, name, id);

    Ok(format!("{} '{}' is added to the database", kind, name))
}

fn rename<C: Controller>(
    controller: &C,
    kind: EntityKind,
    old_name: &str,
    new_name: &str,
) -> Result<String, Error> {
    if entity_exists(controller, kind, new_name)? {
        return Ok(format!("{} '{}' already exists in the database", kind, new_name));
    }

    let id = match entity_id(controller, kind, old_name)? {
        Some(id) => id,
        None => return Ok(missing(kind, old_name)),
    };

    match kind {
        EntityKind::User => controller.rename_user(id, new_name)?,
        EntityKind::Restaurant => controller.rename_restaurant(id, new_name)?,
        EntityKind::Group => controller.rename_group(id, new_name)?,
    }

    Ok(format!("{} '{}' is renamed to '{}'", kind, old_name, new_name))
}

fn delete<C: Controller>(controller: &C, kind: EntityKind, name: &str) -> Result<String, Error> {
    let id = match entity_id(controller, kind, name)? {
        Some(id) => id,
        None => return Ok(missing(kind, name)),
    };

    match kind {
        EntityKind::User => controller.delete_user(id)?,
        EntityKind::Restaurant => controller.delete_restaurant(id)?,
        EntityKind::Group => controller.delete_group(id)?,
    }

    Ok(format!("{} '{}' is deleted from the database", kind, name))
}

fn add_member<C: Controller>(
    controller: &C,
    member: Member,
    name: &str,
    group: &str,
) -> Result<String, Error> {
    let kind = EntityKind::from(member);
    let member_id = match entity_id(controller, kind, name)? {
        Some(id) => id,
        None => return Ok(missing(kind, name)),
    };
    let group_id = match controller.group_id(group)? {
        Some(id) => id,
        None => return Ok(missing(EntityKind::Group, group)),
    };

    let already = match member {
        Member::User => controller.is_user_member_of(member_id, group_id)?,
        Member::Restaurant => controller.is_restaurant_member_of(member_id, group_id)?,
    };
    if already {
        return Ok(format!("{} '{}' is already in Group '{}'", kind, name, group));
    }

    match member {
        Member::User => controller.add_user_to_group(member_id, group_id)?,
        Member::Restaurant => controller.add_restaurant_to_group(member_id, group_id)?,
    }

    Ok(format!("{} '{}' is added to Group '{}'", kind, name, group))
}

fn delete_member<C: Controller>(
    controller: &C,
    member: Member,
    name: &str,
    group: &str,
) -> Result<String, Error> {
    let kind = EntityKind::from(member);
    let member_id = match entity_id(controller, kind, name)? {
        Some(id) => id,
        None => return Ok(missing(kind, name)),
    };
    let group_id = match controller.group_id(group)? {
        Some(id) => id,
        None => return Ok(missing(EntityKind::Group, group)),
    };

    let is_member = match member {
        Member::User => controller.is_user_member_of(member_id, group_id)?,
        Member::Restaurant => controller.is_restaurant_member_of(member_id, group_id)?,
    };
    if !is_member {
        return Ok(format!("{} '{}' is not in Group '{}'", kind, name, group));
    }

    match member {
        Member::User => controller.remove_user_from_group(member_id, group_id)?,
        Member::Restaurant => controller.remove_restaurant_from_group(member_id, group_id)?,
    }

    Ok(format!("{} '{}' is deleted from Group '{}'", kind, name, group))
}

fn today() -> NaiveDate {
    Local::now().naive_local().date()
}

fn add_visit<C: Controller>(controller: &C, visit: &VisitArgs) -> Result<String, Error> {
    let user_id = match controller.user_id(&visit.user)? {
        Some(id) => id,
        None => return Ok(missing(EntityKind::User, &visit.user)),
    };
    let restaurant_id = match controller.restaurant_id(&visit.restaurant)? {
        Some(id) => id,
        None => return Ok(missing(EntityKind::Restaurant, &visit.restaurant)),
    };

    let visit_date = visit.visit_date.unwrap_or_else(today);
    controller.add_visit(&VisitRecord {
        user_id,
        restaurant_id,
        waiting_time_minutes: visit.waiting_time_minutes,
        staff_rating: visit.staff_rating,
        food_rating: visit.food_rating,
        visit_date,
    })?;

    Ok(format!(
        "Visit to Restaurant '{}' by '{}' on {} is added to the database",
        visit.restaurant,
        visit.user,
        visit_date.format("%m/%d/%Y")
    ))
}

fn pick_restaurant<C: Controller>(
    controller: &C,
    selector: &Selector<C>,
    group: &str,
) -> Result<String, Error> {
    let group_id = match controller.group_id(group)? {
        Some(id) => id,
        None => return Ok(missing(EntityKind::Group, group)),
    };

    match selector.pick(group_id)? {
        Some(restaurant) => Ok(format!("Restaurant: '{}'", restaurant)),
        None => Ok(format!("No Restaurants are in Group '{}'", group)),
    }
}

fn render<E: Entity>(entities: &[E], plural: &str) -> String {
    if entities.is_empty() {
        format!("No {} are in the database", plural)
    } else {
        entities.to_table().to_string()
    }
}

fn list<C: Controller>(controller: &C, kind: EntityKind) -> Result<String, Error> {
    let listing = match kind {
        EntityKind::User => render(&controller.users()?, "Users"),
        EntityKind::Restaurant => render(&controller.restaurants()?, "Restaurants"),
        EntityKind::Group => render(&controller.groups()?, "Groups"),
    };

    Ok(listing)
}

fn list_visits<C: Controller>(controller: &C, filter: &VisitFilter) -> Result<String, Error> {
    let visits = match filter {
        VisitFilter::All => controller.visits()?,
        VisitFilter::Restaurant(name) => match controller.restaurant_id(name)? {
            Some(id) => controller.visits_to_restaurant(id)?,
            None => return Ok(missing(EntityKind::Restaurant, name)),
        },
        VisitFilter::User(name) => match controller.user_id(name)? {
            Some(id) => controller.visits_by_user(id)?,
            None => return Ok(missing(EntityKind::User, name)),
        },
    };

    Ok(render(&visits, "Visits"))
}

fn list_members<C: Controller>(controller: &C, group: &str) -> Result<String, Error> {
    let group_id = match controller.group_id(group)? {
        Some(id) => id,
        None => return Ok(missing(EntityKind::Group, group)),
    };

    let mut users = Vec::new();
    for id in controller.users_in_group(group_id)? {
        if let Some(user) = controller.user_by_id(id)? {
            users.push(user.name().to_owned());
        }
    }
    users.sort();

    let mut restaurants = Vec::new();
    for id in controller.restaurants_in_group(group_id)? {
        if let Some(restaurant) = controller.restaurant_by_id(id)? {
            restaurants.push(restaurant.name().to_owned());
        }
    }
    restaurants.sort();

    let mut lines = vec![format!("Group '{}'", group)];
    lines.extend(users.iter().map(|name| format!("  User '{}'", name)));
    lines.extend(restaurants.iter().map(|name| format!("  Restaurant '{}'", name)));

    Ok(lines.join("\n"))
}

/// Run a parsed statement, returning the text to show the user.
pub fn execute<C: Controller>(
    controller: &C,
    selector: &Selector<C>,
    statement: &Statement,
) -> Result<String, Error> {
    log::debug!("Executing {:?}", statement);

    match statement {
        Statement::Add(kind, name) => add(controller, *kind, name),
        Statement::Rename(kind, old_name, new_name) => {
            rename(controller, *kind, old_name, new_name)
        }
        Statement::Delete(kind, name) => delete(controller, *kind, name),
        Statement::AddMember(member, name, group) => add_member(controller, *member, name, group),
        Statement::DeleteMember(member, name, group) => {
            delete_member(controller, *member, name, group)
        }
        Statement::AddVisit(visit) => add_visit(controller, visit),
        Statement::PickRestaurant(group) => pick_restaurant(controller, selector, group),
        Statement::List(kind) => list(controller, *kind),
        Statement::ListVisits(filter) => list_visits(controller, filter),
        Statement::ListMembers(group) => list_members(controller, group),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlite_tracker::SqliteController;

    fn run(controller: &SqliteController, command: &str, args: &[&str]) -> Result<String, Error> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let statement = Statement::parse(command, &args)?;
        let selector = Selector::with_controller(controller);

        execute(controller, &selector, &statement)
    }

    #[test]
    fn user_lifecycle_messages() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;

        assert_eq!(
            run(&controller, "add-user", &["bob"])?,
            "User 'bob' is added to the database"
        );
        assert_eq!(
            run(&controller, "add-user", &["bob"])?,
            "User 'bob' already exists in the database"
        );
        assert_eq!(
            run(&controller, "rename-user", &["bob", "robert"])?,
            "User 'bob' is renamed to 'robert'"
        );
        assert_eq!(
            run(&controller, "rename-user", &["bob", "rob"])?,
            "User 'bob' does not exist in the database"
        );
        assert_eq!(
            run(&controller, "delete-user", &["robert"])?,
            "User 'robert' is deleted from the database"
        );
        assert!(controller.users()?.is_empty());

        Ok(())
    }

    #[test]
    fn rename_onto_taken_name_is_refused() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        run(&controller, "add-group", &["BTL"])?;
        run(&controller, "add-group", &["Lunch"])?;

        assert_eq!(
            run(&controller, "rename-group", &["BTL", "Lunch"])?,
            "Group 'Lunch' already exists in the database"
        );
        assert!(controller.group_exists("BTL")?);

        Ok(())
    }

    #[test]
    fn membership_messages() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        run(&controller, "add-restaurant", &["Amano"])?;
        run(&controller, "add-group", &["BTL"])?;

        assert_eq!(
            run(&controller, "add-restaurant-group", &["Amano", "BTL"])?,
            "Restaurant 'Amano' is added to Group 'BTL'"
        );
        assert_eq!(
            run(&controller, "add-restaurant-group", &["Amano", "BTL"])?,
            "Restaurant 'Amano' is already in Group 'BTL'"
        );
        assert_eq!(
            run(&controller, "add-restaurant-group", &["Amano", "Dinner"])?,
            "Group 'Dinner' does not exist in the database"
        );
        assert_eq!(
            run(&controller, "delete-user-group", &["bob", "BTL"])?,
            "User 'bob' does not exist in the database"
        );
        assert_eq!(
            run(&controller, "delete-restaurant-group", &["Amano", "BTL"])?,
            "Restaurant 'Amano' is deleted from Group 'BTL'"
        );
        assert_eq!(
            run(&controller, "delete-restaurant-group", &["Amano", "BTL"])?,
            "Restaurant 'Amano' is not in Group 'BTL'"
        );

        Ok(())
    }

    #[test]
    fn visit_and_pick() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        run(&controller, "add-user", &["bob"])?;
        run(&controller, "add-restaurant", &["Amano"])?;
        run(&controller, "add-group", &["BTL"])?;

        assert_eq!(
            run(&controller, "pick-restaurant", &["BTL"])?,
            "No Restaurants are in Group 'BTL'"
        );

        run(&controller, "add-restaurant-group", &["Amano", "BTL"])?;
        assert_eq!(
            run(&controller, "add-restaurant-visit", &["bob", "Amano", "10", "4", "5", "3/7/21"])?,
            "Visit to Restaurant 'Amano' by 'bob' on 03/07/2021 is added to the database"
        );
        assert_eq!(
            run(&controller, "pick-restaurant", &["BTL"])?,
            "Restaurant: 'Amano'"
        );
        assert_eq!(
            run(&controller, "pick-restaurant", &["Dinner"])?,
            "Group 'Dinner' does not exist in the database"
        );

        Ok(())
    }

    #[test]
    fn visit_without_date_uses_today() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        run(&controller, "add-user", &["bob"])?;
        run(&controller, "add-restaurant", &["Amano"])?;

        run(&controller, "add-restaurant-visit", &["bob", "Amano", "0", "3", "3"])?;

        let visits = controller.visits()?;
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].visit_date, today());

        Ok(())
    }

    #[test]
    fn visit_to_unknown_restaurant() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        run(&controller, "add-user", &["bob"])?;

        assert_eq!(
            run(&controller, "add-restaurant-visit", &["bob", "Nowhere", "1", "3", "3"])?,
            "Restaurant 'Nowhere' does not exist in the database"
        );
        assert!(controller.visits()?.is_empty());

        Ok(())
    }

    #[test]
    fn listings() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        assert_eq!(run(&controller, "list-users", &[])?, "No Users are in the database");

        run(&controller, "add-user", &["bob"])?;
        run(&controller, "add-user", &["alice"])?;
        run(&controller, "add-group", &["BTL"])?;
        run(&controller, "add-restaurant", &["Amano"])?;
        run(&controller, "add-user-group", &["bob", "BTL"])?;
        run(&controller, "add-user-group", &["alice", "BTL"])?;
        run(&controller, "add-restaurant-group", &["Amano", "BTL"])?;

        let users = run(&controller, "list-users", &[])?;
        assert!(users.contains("bob"));
        assert!(users.contains("alice"));

        assert_eq!(
            run(&controller, "list-members", &["BTL"])?,
            "Group 'BTL'\n  User 'alice'\n  User 'bob'\n  Restaurant 'Amano'"
        );
        assert_eq!(
            run(&controller, "list-visits", &["user", "bob"])?,
            "No Visits are in the database"
        );

        Ok(())
    }

    #[test]
    fn every_listing_renders_a_table() -> Result<(), Error> {
        let controller = SqliteController::in_memory()?;
        run(&controller, "add-user", &["bob"])?;
        run(&controller, "add-restaurant", &["Louie's Pizza"])?;
        run(&controller, "add-group", &["BTL"])?;
        run(
            &controller,
            "add-restaurant-visit",
            &["bob", "Louie's Pizza", "12", "4", "5", "6/1/21"],
        )?;

        assert!(run(&controller, "list-users", &[])?.contains("bob"));
        assert!(run(&controller, "list-restaurants", &[])?.contains("Louie's Pizza"));
        assert!(run(&controller, "list-groups", &[])?.contains("BTL"));

        let visits = run(&controller, "list-visits", &[])?;
        assert!(visits.contains("06/01/2021"));
        assert!(visits.contains("waiting_time_minutes"));

        let by_restaurant = run(&controller, "list-visits", &["restaurant", "Louie's Pizza"])?;
        assert_eq!(by_restaurant, visits);

        Ok(())
    }
}
