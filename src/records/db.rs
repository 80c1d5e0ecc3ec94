use anyhow::{anyhow, Result};
use diesel::{mysql::MysqlConnection, prelude::*, result::Error as DieselError};

use crate::{
    catalog::{Catalog, Character, Country, Course, Machine, User},
    engine::Snapshot,
    helpers::{get_connection, MysqlPool},
    records::{NewRecord, Record, RecordSource},
    schema::{characters, countries, courses, machines, records, users},
};

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

/// Records straight out of MySQL, one pooled connection per call.
pub struct DbSource {
    pool: MysqlPool,
}

impl DbSource {
    pub fn new(pool: MysqlPool) -> Self {
        DbSource { pool: pool }
    }

    /// The catalog and one pair's records, read in a single transaction.
    /// `None` if the course or machine doesn't exist.
    pub fn pair_snapshot(&self, course_key: &str, machine_name: &str) -> Result<Option<Snapshot>> {
        let pooled = get_connection(&self.pool)?;
        let conn: &MysqlConnection = &pooled;
        let loaded = conn.transaction::<_, DieselError, _>(|| {
            let catalog = load_catalog(conn)?;
            let (course, machine) = match catalog.pair_key(course_key, machine_name) {
                Some(pair) => pair,
                None => return Ok(None),
            };
            let rows = pair_records(conn, course, machine)?;
            Ok(Some((catalog, rows)))
        })?;

        Ok(loaded.map(|(catalog, rows)| Snapshot::new(catalog, rows)))
    }
}

impl RecordSource for DbSource {
    type Error = anyhow::Error;

    fn all_records(&self) -> Result<Vec<Record>> {
        let conn = get_connection(&self.pool)?;
        Ok(load_records(&conn)?)
    }

    fn records_for_pair(&self, course: u32, machine: u32) -> Result<Vec<Record>> {
        let conn = get_connection(&self.pool)?;
        Ok(pair_records(&conn, course, machine)?)
    }

    fn records_for_course(&self, course: u32) -> Result<Vec<Record>> {
        let conn = get_connection(&self.pool)?;
        let rows = records::table
            .filter(records::course_id.eq(course))
            .load::<Record>(&conn)?;

        Ok(rows)
    }
}

#[inline]
fn load_records(conn: &MysqlConnection) -> Result<Vec<Record>, DieselError> {
    records::table.load::<Record>(conn)
}

fn pair_records(
    conn: &MysqlConnection,
    course: u32,
    machine: u32,
) -> Result<Vec<Record>, DieselError> {
    records::table
        .filter(records::course_id.eq(course))
        .filter(records::machine_id.eq(machine))
        .load::<Record>(conn)
}

pub fn load_catalog(conn: &MysqlConnection) -> Result<Catalog, DieselError> {
    let course_rows = courses::table.load::<Course>(conn)?;
    let machine_rows = machines::table.load::<Machine>(conn)?;
    let character_rows = characters::table.load::<Character>(conn)?;
    let user_rows = users::table.load::<User>(conn)?;
    let country_rows = countries::table
        .order(countries::name.asc())
        .load::<Country>(conn)?;

    Ok(Catalog::from_parts(
        course_rows,
        machine_rows,
        character_rows,
        user_rows,
        country_rows,
    ))
}

/// Catalog and records come from one transaction so a reconstruction pass
/// never mixes two states of the table.
pub fn load_snapshot(conn: &MysqlConnection) -> Result<Snapshot> {
    let (catalog, rows) = conn.transaction::<_, DieselError, _>(|| {
        let catalog = load_catalog(conn)?;
        let rows = load_records(conn)?;
        Ok((catalog, rows))
    })?;
    info!(
        "Loaded {} record(s) and {} user(s)",
        rows.len(),
        catalog.users().count()
    );

    Ok(Snapshot::new(catalog, rows))
}

pub fn insert_record(conn: &MysqlConnection, new_record: &NewRecord) -> Result<u32> {
    let id: u64 = conn.transaction::<_, DieselError, _>(|| {
        diesel::insert_into(records::table)
            .values(new_record)
            .execute(conn)?;
        diesel::select(last_insert_id).first::<u64>(conn)
    })?;
    let id = u32::try_from(id).map_err(|_| anyhow!("Record id {} is out of range", id))?;
    info!(
        "Stored record {} ({}) for user {}",
        id, &new_record.time_str, new_record.user_id
    );

    Ok(id)
}

/// Deletes a user and everything they submitted. Returns how many records went
/// with them, or `None` if there was no such user.
pub fn delete_user(conn: &MysqlConnection, user: u32) -> Result<Option<usize>> {
    let removed = conn.transaction::<_, DieselError, _>(|| {
        let owned = diesel::delete(records::table.filter(records::user_id.eq(user))).execute(conn)?;
        let users_removed = diesel::delete(users::table.filter(users::id.eq(user))).execute(conn)?;
        match users_removed {
            0 => Err(DieselError::RollbackTransaction),
            _ => Ok(owned),
        }
    });

    match removed {
        Ok(n) => {
            info!("Deleted user {} along with {} record(s)", user, n);
            Ok(Some(n))
        }
        Err(DieselError::RollbackTransaction) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
