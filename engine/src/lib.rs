// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Picks the next restaurant for a group: the restaurants in the group that
//! the group's members visited least recently form a candidate set, and one
//! of them is drawn at random.

use anyhow::Error;
use chrono::NaiveDate;
use config::SelectorConfig;
use controller::{Controller, Id, Named, Visit};
use rand::{seq::SliceRandom, Rng};
use std::collections::HashMap;

pub const DEFAULT_CANDIDATES: usize = 10;

/// Most recent visit date for every restaurant that shows up in `visits`.
pub fn last_visits<V: Visit>(visits: &[V]) -> HashMap<Id, NaiveDate> {
    let mut last = HashMap::new();

    for visit in visits {
        let date = last
            .entry(visit.restaurant_id())
            .or_insert_with(|| visit.visit_date());

        if visit.visit_date() > *date {
            *date = visit.visit_date();
        }
    }

    last
}

pub struct Selector<'a, C>
where
    C: Controller,
{
    controller: &'a C,
    candidates: usize,
}

impl<'a, C> Selector<'a, C>
where
    C: Controller,
{
    pub fn with_controller(controller: &'a C) -> Self {
        Self {
            controller,
            candidates: DEFAULT_CANDIDATES,
        }
    }

    /// A candidate count of zero is raised to one.
    pub fn with_config(controller: &'a C, config: &SelectorConfig) -> Self {
        Self {
            controller,
            candidates: config.candidates.max(1),
        }
    }

    /// Restaurants of the group ordered by their last visit by a member of
    /// the group, never visited first, truncated to the candidate count.
    pub fn candidates(&self, group_id: Id) -> Result<Vec<Id>, Error> {
        let restaurants = self.controller.restaurants_in_group(group_id)?;
        if restaurants.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.controller.users_in_group(group_id)?;
        let visits = self.controller.visits_by_users_to(&users, &restaurants)?;
        let last = last_visits(&visits);

        // None sorts before any date, equal dates fall back to the id
        let mut ranked: Vec<(Option<NaiveDate>, Id)> = restaurants
            .iter()
            .map(|id| (last.get(id).copied(), *id))
            .collect();
        ranked.sort();
        ranked.truncate(self.candidates);

        log::debug!(
            "Group id({}): {} restaurant(s), {} member(s), {} relevant visit(s), {} candidate(s)",
            group_id,
            restaurants.len(),
            users.len(),
            visits.len(),
            ranked.len()
        );

        Ok(ranked.into_iter().map(|(_, id)| id).collect())
    }

    /// Name of the picked restaurant, `None` if the group has no restaurants.
    pub fn pick_with<R>(&self, group_id: Id, rng: &mut R) -> Result<Option<String>, Error>
    where
        R: Rng + ?Sized,
    {
        let candidates = self.candidates(group_id)?;
        let chosen = match candidates.choose(rng) {
            Some(id) => *id,
            None => return Ok(None),
        };

        let restaurant = self.controller.restaurant_by_id(chosen)?;
        Ok(restaurant.map(|restaurant| restaurant.name().to_owned()))
    }

    pub fn pick(&self, group_id: Id) -> Result<Option<String>, Error> {
        self.pick_with(group_id, &mut rand::thread_rng())
    }
}
