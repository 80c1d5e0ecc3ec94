table! {
    countries (code) {
        code -> Varchar,
        name -> Varchar,
    }
}

table! {
    courses (id) {
        id -> Unsigned<Integer>,
        course_key -> Varchar,
        name -> Varchar,
        map_icon -> Nullable<Varchar>,
    }
}

table! {
    machines (id) {
        id -> Unsigned<Integer>,
        name -> Varchar,
        icon -> Varchar,
    }
}

table! {
    characters (id) {
        id -> Unsigned<Integer>,
        name -> Varchar,
        icon -> Varchar,
    }
}

table! {
    users (id) {
        id -> Unsigned<Integer>,
        username -> Varchar,
        password_hash -> Varchar,
        country_code -> Nullable<Varchar>,
    }
}

table! {
    records (id) {
        id -> Unsigned<Integer>,
        course_id -> Unsigned<Integer>,
        machine_id -> Unsigned<Integer>,
        character_id -> Unsigned<Integer>,
        user_id -> Unsigned<Integer>,
        time_str -> Varchar,
        time_ms -> Unsigned<Integer>,
        date_set -> Date,
        lap1 -> Nullable<Float>,
        lap2 -> Nullable<Float>,
        lap3 -> Nullable<Float>,
        proof_url -> Varchar,
        created_at -> Datetime,
    }
}

joinable!(records -> courses (course_id));
joinable!(records -> machines (machine_id));
joinable!(records -> characters (character_id));
joinable!(records -> users (user_id));

allow_tables_to_appear_in_same_query!(
    countries,
    courses,
    machines,
    characters,
    users,
    records,
);
