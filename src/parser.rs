// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

mod basics;

use basics::parse_token;
use chrono::{Datelike, NaiveDate};
use controller::EntityKind;
use nom::{character::complete::multispace0, multi::many0, sequence::preceded};
use thiserror::Error as DError;

pub const DATE_FORMAT: &str = "%m/%d/%y";

/// Two digit years from here on belong to the previous century (`50` is 1950).
const TWO_DIGIT_YEAR_ROLLOVER: i32 = 2050;

/// Every command name `Statement::parse` understands, in lower case.
pub const COMMANDS: [&str; 20] = [
    "add-user",
    "rename-user",
    "delete-user",
    "add-restaurant",
    "rename-restaurant",
    "delete-restaurant",
    "add-group",
    "rename-group",
    "delete-group",
    "add-user-group",
    "delete-user-group",
    "add-restaurant-group",
    "delete-restaurant-group",
    "add-restaurant-visit",
    "pick-restaurant",
    "list-users",
    "list-restaurants",
    "list-groups",
    "list-visits",
    "list-members",
];

pub fn is_command(name: &str) -> bool {
    COMMANDS.contains(&name.to_lowercase().as_str())
}

#[derive(Debug, Clone, Eq, PartialEq, DError)]
pub enum ValidationError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Expected {expected} arguments")]
    ArgumentCount { expected: &'static str, got: usize },

    #[error("Wait time '{0}' is not a positive integer")]
    WaitTime(String),

    #[error("Staff rating '{0}' is not an integer from 1 to 5")]
    StaffRating(String),

    #[error("Food rating '{0}' is not an integer from 1 to 5")]
    FoodRating(String),

    #[error("Visit Date '{0}' is not a valid date in the format M/d/yy")]
    VisitDate(String),

    #[error("Visits can be listed by 'restaurant' or 'user', not '{0}'")]
    VisitFilter(String),
}

impl ValidationError {
    /// Errors caused by a malformed command line rather than a bad value
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            ValidationError::UnknownCommand(_) | ValidationError::ArgumentCount { .. }
        )
    }
}

/// Things that can be members of a group
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Member {
    User,
    Restaurant,
}

impl From<Member> for EntityKind {
    fn from(member: Member) -> Self {
        match member {
            Member::User => EntityKind::User,
            Member::Restaurant => EntityKind::Restaurant,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VisitArgs {
    pub user: String,
    pub restaurant: String,
    pub waiting_time_minutes: i32,
    pub staff_rating: i32,
    pub food_rating: i32,
    pub visit_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VisitFilter {
    All,
    Restaurant(String),
    User(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    Add(EntityKind, String),
    Rename(EntityKind, String, String),
    Delete(EntityKind, String),
    AddMember(Member, String, String),
    DeleteMember(Member, String, String),
    AddVisit(VisitArgs),
    PickRestaurant(String),
    List(EntityKind),
    ListVisits(VisitFilter),
    ListMembers(String),
}

fn expect_args(
    args: &[String],
    count: usize,
    expected: &'static str,
) -> Result<(), ValidationError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ValidationError::ArgumentCount {
            expected,
            got: args.len(),
        })
    }
}

fn parse_wait_time(input: &str) -> Result<i32, ValidationError> {
    match input.parse::<i32>() {
        Ok(minutes) if minutes >= 0 => Ok(minutes),
        _ => Err(ValidationError::WaitTime(input.into())),
    }
}

fn parse_rating(input: &str) -> Option<i32> {
    input.parse::<i32>().ok().filter(|rating| (1..=5).contains(rating))
}

pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::VisitDate(input.into());
    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())?;

    if date.year() < TWO_DIGIT_YEAR_ROLLOVER {
        Ok(date)
    } else {
        date.with_year(date.year() - 100).ok_or_else(invalid)
    }
}

fn parse_visit(args: &[String]) -> Result<VisitArgs, ValidationError> {
    if args.len() < 5 || args.len() > 6 {
        return Err(ValidationError::ArgumentCount {
            expected: "5 to 6",
            got: args.len(),
        });
    }

    let waiting_time_minutes = parse_wait_time(&args[2])?;
    let staff_rating =
        parse_rating(&args[3]).ok_or_else(|| ValidationError::StaffRating(args[3].clone()))?;
    let food_rating =
        parse_rating(&args[4]).ok_or_else(|| ValidationError::FoodRating(args[4].clone()))?;

    let visit_date = match args.get(5) {
        Some(date) => Some(parse_date(date)?),
        None => None,
    };

    Ok(VisitArgs {
        user: args[0].clone(),
        restaurant: args[1].clone(),
        waiting_time_minutes,
        staff_rating,
        food_rating,
        visit_date,
    })
}

fn parse_visit_filter(args: &[String]) -> Result<VisitFilter, ValidationError> {
    match args {
        [] => Ok(VisitFilter::All),
        [by, name] => match by.to_lowercase().as_str() {
            "restaurant" => Ok(VisitFilter::Restaurant(name.clone())),
            "user" => Ok(VisitFilter::User(name.clone())),
            _ => Err(ValidationError::VisitFilter(by.clone())),
        },
        _ => Err(ValidationError::ArgumentCount {
            expected: "0 or 2",
            got: args.len(),
        }),
    }
}

impl Statement {
    /// Build a statement from a command name (any case) and its arguments.
    pub fn parse(command: &str, args: &[String]) -> Result<Self, ValidationError> {
        let statement = match command.to_lowercase().as_str() {
            "add-user" => {
                expect_args(args, 1, "1")?;
                Statement::Add(EntityKind::User, args[0].clone())
            }
            "rename-user" => {
                expect_args(args, 2, "2")?;
                Statement::Rename(EntityKind::User, args[0].clone(), args[1].clone())
            }
            "delete-user" => {
                expect_args(args, 1, "1")?;
                Statement::Delete(EntityKind::User, args[0].clone())
            }

            "add-restaurant" => {
                expect_args(args, 1, "1")?;
                Statement::Add(EntityKind::Restaurant, args[0].clone())
            }
            "rename-restaurant" => {
                expect_args(args, 2, "2")?;
                Statement::Rename(EntityKind::Restaurant, args[0].clone(), args[1].clone())
            }
            "delete-restaurant" => {
                expect_args(args, 1, "1")?;
                Statement::Delete(EntityKind::Restaurant, args[0].clone())
            }

            "add-group" => {
                expect_args(args, 1, "1")?;
                Statement::Add(EntityKind::Group, args[0].clone())
            }
            "rename-group" => {
                expect_args(args, 2, "2")?;
                Statement::Rename(EntityKind::Group, args[0].clone(), args[1].clone())
            }
            "delete-group" => {
                expect_args(args, 1, "1")?;
                Statement::Delete(EntityKind::Group, args[0].clone())
            }

            "add-user-group" => {
                expect_args(args, 2, "2")?;
                Statement::AddMember(Member::User, args[0].clone(), args[1].clone())
            }
            "delete-user-group" => {
                expect_args(args, 2, "2")?;
                Statement::DeleteMember(Member::User, args[0].clone(), args[1].clone())
            }
            "add-restaurant-group" => {
                expect_args(args, 2, "2")?;
                Statement::AddMember(Member::Restaurant, args[0].clone(), args[1].clone())
            }
            "delete-restaurant-group" => {
                expect_args(args, 2, "2")?;
                Statement::DeleteMember(Member::Restaurant, args[0].clone(), args[1].clone())
            }

            "add-restaurant-visit" => Statement::AddVisit(parse_visit(args)?),

            "pick-restaurant" => {
                expect_args(args, 1, "1")?;
                Statement::PickRestaurant(args[0].clone())
            }

            "list-users" => {
                expect_args(args, 0, "0")?;
                Statement::List(EntityKind::User)
            }
            "list-restaurants" => {
                expect_args(args, 0, "0")?;
                Statement::List(EntityKind::Restaurant)
            }
            "list-groups" => {
                expect_args(args, 0, "0")?;
                Statement::List(EntityKind::Group)
            }
            "list-visits" => Statement::ListVisits(parse_visit_filter(args)?),
            "list-members" => {
                expect_args(args, 1, "1")?;
                Statement::ListMembers(args[0].clone())
            }

            _ => return Err(ValidationError::UnknownCommand(command.into())),
        };

        Ok(statement)
    }
}

/// Split an interactive line into words, "double" or 'single' quoted
/// strings keep their spaces. `None` on an unterminated quote.
pub fn tokenize(line: &str) -> Option<Vec<String>> {
    let (rest, tokens) = many0(preceded(multispace0, parse_token))(line).ok()?;

    if rest.trim().is_empty() {
        Some(tokens.into_iter().map(String::from).collect())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn command_names_ignore_case() {
        let parsed = Statement::parse("Add-User", &args(&["mquinlan"]));
        let expected = Statement::Add(EntityKind::User, "mquinlan".into());

        assert_eq!(parsed, Ok(expected));

        let parsed = Statement::parse("PICK-RESTAURANT", &args(&["BTL"]));
        assert_eq!(parsed, Ok(Statement::PickRestaurant("BTL".into())));
    }

    #[test]
    fn membership_statements() {
        let parsed = Statement::parse("add-restaurant-group", &args(&["Amano", "BTL"]));
        let expected = Statement::AddMember(Member::Restaurant, "Amano".into(), "BTL".into());

        assert_eq!(parsed, Ok(expected));

        let parsed = Statement::parse("delete-user-group", &args(&["bob", "BTL"]));
        let expected = Statement::DeleteMember(Member::User, "bob".into(), "BTL".into());

        assert_eq!(parsed, Ok(expected));
    }

    #[test]
    fn wrong_argument_count() {
        let parsed = Statement::parse("rename-group", &args(&["BTL"]));
        assert_eq!(
            parsed,
            Err(ValidationError::ArgumentCount {
                expected: "2",
                got: 1
            })
        );
        assert!(parsed.unwrap_err().shows_usage());

        let parsed = Statement::parse("add-restaurant-visit", &args(&["bob", "Amano"]));
        assert_eq!(
            parsed,
            Err(ValidationError::ArgumentCount {
                expected: "5 to 6",
                got: 2
            })
        );
    }

    #[test]
    fn unknown_command() {
        let parsed = Statement::parse("order-pizza", &[]);
        assert_eq!(
            parsed,
            Err(ValidationError::UnknownCommand("order-pizza".into()))
        );
    }

    #[test]
    fn visit_with_and_without_date() {
        let parsed = Statement::parse(
            "add-restaurant-visit",
            &args(&["bob", "Amano", "15", "4", "5"]),
        );
        let expected = Statement::AddVisit(VisitArgs {
            user: "bob".into(),
            restaurant: "Amano".into(),
            waiting_time_minutes: 15,
            staff_rating: 4,
            food_rating: 5,
            visit_date: None,
        });

        assert_eq!(parsed, Ok(expected));

        let parsed = Statement::parse(
            "add-restaurant-visit",
            &args(&["bob", "Amano", "0", "1", "1", "1/2/21"]),
        );
        match parsed {
            Ok(Statement::AddVisit(visit)) => {
                assert_eq!(visit.visit_date, NaiveDate::from_ymd_opt(2021, 1, 2))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn visit_values_are_validated() {
        let visit = |wait: &str, staff: &str, food: &str, date: &str| {
            Statement::parse(
                "add-restaurant-visit",
                &args(&["bob", "Amano", wait, staff, food, date]),
            )
        };

        assert_eq!(
            visit("-1", "3", "3", "1/1/21"),
            Err(ValidationError::WaitTime("-1".into()))
        );
        assert_eq!(
            visit("ten", "3", "3", "1/1/21"),
            Err(ValidationError::WaitTime("ten".into()))
        );
        assert_eq!(
            visit("10", "0", "3", "1/1/21"),
            Err(ValidationError::StaffRating("0".into()))
        );
        assert_eq!(
            visit("10", "3", "6", "1/1/21"),
            Err(ValidationError::FoodRating("6".into()))
        );
        assert_eq!(
            visit("10", "3", "3", "2021-01-01"),
            Err(ValidationError::VisitDate("2021-01-01".into()))
        );
        assert_eq!(
            visit("10", "3", "3", "13/1/21"),
            Err(ValidationError::VisitDate("13/1/21".into()))
        );
    }

    #[test]
    fn first_bad_visit_value_is_reported() {
        let visit = |values: &[&str]| Statement::parse("add-restaurant-visit", &args(values));

        assert_eq!(
            visit(&["bob", "Amano", "-1", "0", "9", "1/1"]),
            Err(ValidationError::WaitTime("-1".into()))
        );
        assert_eq!(
            visit(&["bob", "Amano", "5", "0", "9", "1/1"]),
            Err(ValidationError::StaffRating("0".into()))
        );
        assert_eq!(
            visit(&["bob", "Amano", "5", "3", "9", "1/1"]),
            Err(ValidationError::FoodRating("9".into()))
        );
    }

    #[test]
    fn two_digit_years_roll_over_at_fifty() {
        assert_eq!(parse_date("1/1/49"), Ok(NaiveDate::from_ymd_opt(2049, 1, 1).unwrap()));
        assert_eq!(parse_date("1/1/50"), Ok(NaiveDate::from_ymd_opt(1950, 1, 1).unwrap()));
        assert_eq!(parse_date("2/29/60"), Ok(NaiveDate::from_ymd_opt(1960, 2, 29).unwrap()));
        assert_eq!(parse_date("12/31/99"), Ok(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()));
    }

    #[test]
    fn known_command_names() {
        assert!(is_command("Add-User"));
        assert!(is_command("list-members"));
        assert!(!is_command("restaurants.sqlite"));

        for command in COMMANDS.iter() {
            assert_ne!(
                Statement::parse(command, &[]),
                Err(ValidationError::UnknownCommand(command.to_string()))
            );
        }
    }

    #[test]
    fn list_visit_filters() {
        assert_eq!(
            Statement::parse("list-visits", &[]),
            Ok(Statement::ListVisits(VisitFilter::All))
        );
        assert_eq!(
            Statement::parse("list-visits", &args(&["User", "bob"])),
            Ok(Statement::ListVisits(VisitFilter::User("bob".into())))
        );
        assert_eq!(
            Statement::parse("list-visits", &args(&["group", "BTL"])),
            Err(ValidationError::VisitFilter("group".into()))
        );
    }

    #[test]
    fn tokenize_lines() {
        assert_eq!(
            tokenize("add-restaurant  \"Louie's Pizza & Italian Restaurant\" "),
            Some(args(&["add-restaurant", "Louie's Pizza & Italian Restaurant"]))
        );
        assert_eq!(
            tokenize("rename-user 'Michael Quinlan' mq"),
            Some(args(&["rename-user", "Michael Quinlan", "mq"]))
        );
        assert_eq!(tokenize("   "), Some(Vec::new()));
        assert_eq!(tokenize("add-user \"unterminated"), None);
    }
}
