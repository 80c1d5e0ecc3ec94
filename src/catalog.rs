use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::{
    records::PairKey,
    schema::{characters, courses, machines, users},
};

/// Shown for players who never picked a country.
pub const DEFAULT_NATION: &str = "us";
const TOP_RIDE_MARKER: &str = "(Top Ride)";

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[table_name = "courses"]
pub struct Course {
    pub id: u32,
    pub course_key: String,
    pub name: String,
    pub map_icon: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseFamily {
    AirRide,
    TopRide,
}

impl fmt::Display for CourseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CourseFamily::AirRide => write!(f, "Air Ride"),
            CourseFamily::TopRide => write!(f, "Top Ride"),
        }
    }
}

impl Course {
    pub fn family(&self) -> CourseFamily {
        match self.name.contains(TOP_RIDE_MARKER) {
            true => CourseFamily::TopRide,
            false => CourseFamily::AirRide,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[table_name = "machines"]
pub struct Machine {
    pub id: u32,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[table_name = "characters"]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[table_name = "users"]
pub struct User {
    pub id: u32,
    pub username: String,
    pub password_hash: String,
    pub country_code: Option<String>,
}

/// Where a player's world records count in the country table. Players without
/// a country are kept apart instead of being folded into the display default.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CountryBucket {
    Known(String),
    Unknown,
}

impl CountryBucket {
    pub const UNKNOWN_CODE: &'static str = "??";

    pub fn code(&self) -> &str {
        match self {
            CountryBucket::Known(code) => code.as_str(),
            CountryBucket::Unknown => Self::UNKNOWN_CODE,
        }
    }
}

impl User {
    pub fn country_bucket(&self) -> CountryBucket {
        match self.country_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => CountryBucket::Known(code.to_lowercase()),
            _ => CountryBucket::Unknown,
        }
    }

    pub fn nation_code(&self) -> String {
        match self.country_bucket() {
            CountryBucket::Known(code) => code,
            CountryBucket::Unknown => DEFAULT_NATION.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct Country {
    pub code: String,
    pub name: String,
}

/// Everything a record points at, indexed for the renderers.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: BTreeMap<u32, Course>,
    machines: BTreeMap<u32, Machine>,
    characters: BTreeMap<u32, Character>,
    users: BTreeMap<u32, User>,
    countries: Vec<Country>,
}

impl Catalog {
    pub fn from_parts(
        courses: Vec<Course>,
        machines: Vec<Machine>,
        characters: Vec<Character>,
        users: Vec<User>,
        countries: Vec<Country>,
    ) -> Self {
        Catalog {
            courses: courses.into_iter().map(|c| (c.id, c)).collect(),
            machines: machines.into_iter().map(|m| (m.id, m)).collect(),
            characters: characters.into_iter().map(|c| (c.id, c)).collect(),
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            countries: countries,
        }
    }

    #[inline]
    pub fn course(&self, id: u32) -> Option<&Course> {
        self.courses.get(&id)
    }

    pub fn course_by_key(&self, key: &str) -> Option<&Course> {
        self.courses.values().find(|c| c.course_key == key)
    }

    #[inline]
    pub fn machine(&self, id: u32) -> Option<&Machine> {
        self.machines.get(&id)
    }

    pub fn machine_by_name(&self, name: &str) -> Option<&Machine> {
        self.machines.values().find(|m| m.name == name)
    }

    #[inline]
    pub fn character(&self, id: u32) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters.values().find(|c| c.name == name)
    }

    #[inline]
    pub fn user(&self, id: u32) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Ids for a course key and machine name, if both exist.
    pub fn pair_key(&self, course_key: &str, machine_name: &str) -> Option<PairKey> {
        let course = self.course_by_key(course_key)?;
        let machine = self.machine_by_name(machine_name)?;

        Some((course.id, machine.id))
    }

    pub fn remove_user(&mut self, id: u32) -> Option<User> {
        self.users.remove(&id)
    }
}

/// "Floria Fields" -> "floria-fields"
pub fn slugify_course_key(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}
