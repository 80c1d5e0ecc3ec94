use crate::{error::InconsistentRecord, records::time::decode, records::Record};

#[derive(Debug, Clone, Default)]
pub struct Screened {
    pub accepted: Vec<Record>,
    pub flagged: Vec<InconsistentRecord>,
}

pub fn check(record: &Record) -> Result<(), InconsistentRecord> {
    let decoded = decode(&record.time_str);
    match decoded {
        Ok(ms) if ms == record.time_ms => Ok(()),
        _ => Err(InconsistentRecord {
            record_id: record.id,
            time_str: record.time_str.clone(),
            stored_ms: record.time_ms,
            decoded: decoded,
        }),
    }
}

/// Splits rows into the ones the rankings can trust and the ones to report.
/// A bad row never aborts the pass.
pub fn screen(records: Vec<Record>) -> Screened {
    let mut screened = Screened {
        accepted: Vec::with_capacity(records.len()),
        flagged: Vec::new(),
    };
    for record in records {
        match check(&record) {
            Ok(()) => screened.accepted.push(record),
            Err(e) => {
                warn!("Excluding record from rankings: {}", e);
                screened.flagged.push(e);
            }
        }
    }

    screened
}
