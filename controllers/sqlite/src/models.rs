pub mod groups;
pub mod memberships;
pub mod restaurants;
pub mod users;
pub mod visits;
