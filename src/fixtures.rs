// shared test catalog: two courses, two machines, one character, four players

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::{
    catalog::{Catalog, Character, Country, Course, Machine, User},
    records::{
        time::{decode, format_ms},
        NewRecord, Record,
    },
};

pub const FLORIA: u32 = 1;
pub const FLOWER: u32 = 2;
pub const WARP_STAR: u32 = 1;
pub const WAGON_STAR: u32 = 2;
pub const KIRBY: u32 = 1;
pub const ASH: u32 = 1;
pub const BEA: u32 = 2;
pub const CAL: u32 = 3;
pub const DEE: u32 = 4;

pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

pub fn noon(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(12, 0, 0).unwrap()
}

fn user(id: u32, name: &str, country: Option<&str>) -> User {
    User {
        id: id,
        username: name.to_owned(),
        password_hash: String::new(),
        country_code: country.map(str::to_owned),
    }
}

pub fn catalog() -> Catalog {
    Catalog::from_parts(
        vec![
            Course {
                id: FLORIA,
                course_key: "floria-fields".to_owned(),
                name: "Floria Fields".to_owned(),
                map_icon: Some("images/mapICONS/Floria_Fields.png".to_owned()),
            },
            Course {
                id: FLOWER,
                course_key: "flower".to_owned(),
                name: "Flower (Top Ride)".to_owned(),
                map_icon: None,
            },
        ],
        vec![
            Machine {
                id: WARP_STAR,
                name: "Warp Star".to_owned(),
                icon: "images/machineICONS/Warp_Star.png".to_owned(),
            },
            Machine {
                id: WAGON_STAR,
                name: "Wagon Star".to_owned(),
                icon: "images\\machineICONS\\Wagon_Star.png".to_owned(),
            },
        ],
        vec![Character {
            id: KIRBY,
            name: "Kirby".to_owned(),
            icon: "/images/charICONS/Kirby.png".to_owned(),
        }],
        vec![
            user(ASH, "ash", Some("JP")),
            user(BEA, "bea", Some("us")),
            user(CAL, "cal", None),
            user(DEE, "Dee", Some("ca")),
        ],
        vec![
            Country {
                code: "jp".to_owned(),
                name: "Japan".to_owned(),
            },
            Country {
                code: "ca".to_owned(),
                name: "Canada".to_owned(),
            },
            Country {
                code: "us".to_owned(),
                name: "United States".to_owned(),
            },
        ],
    )
}

pub fn new_record(course: u32, machine: u32, user: u32, time: &str, date: NaiveDate) -> NewRecord {
    NewRecord {
        course_id: course,
        machine_id: machine,
        character_id: KIRBY,
        user_id: user,
        time_str: time.to_owned(),
        time_ms: decode(time).unwrap(),
        date_set: date,
        lap1: None,
        lap2: None,
        lap3: None,
        proof_url: "/uploads/placeholder.png".to_owned(),
        created_at: noon(date),
    }
}

pub fn record(id: u32, course: u32, machine: u32, user: u32, ms: u32, date: NaiveDate) -> Record {
    Record {
        id: id,
        course_id: course,
        machine_id: machine,
        character_id: KIRBY,
        user_id: user,
        time_str: format_ms(ms),
        time_ms: ms,
        date_set: date,
        lap1: None,
        lap2: None,
        lap3: None,
        proof_url: "/uploads/placeholder.png".to_owned(),
        created_at: noon(date),
    }
}
