// `.dfa` text format: one transition record per line.
//
//   from label to status reserved
//
// `status` and `reserved` are hexadecimal. Bit 0x1 of `status` marks `from`
// as accepting. A record whose label and destination are both -1 carries no
// transition: it is the end-state marker `s -1 -1 1 0`. Downstream readers
// depend on that exact shape.

use crate::FaError;

/// Label/destination value of an end-state marker record.
pub const SENTINEL: i32 = -1;

/// Status bit marking the source state as accepting.
pub const ACCEPT_FLAG: u32 = 0x1;

/// Largest state or label id accepted on input. Graphs are stored densely,
/// so ids bound memory use.
pub const MAX_ID: i32 = (1 << 20) - 1;

/// Line that terminates a graph embedded in a larger file.
pub const END_OF_GRAPH: &str = "DFAEND";

/// One line of a `.dfa` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaRecord {
    pub from: i32,
    pub label: i32,
    pub to: i32,
    pub status: u32,
    pub reserved: u32,
}

impl DfaRecord {
    /// A transition record.
    pub fn arc(from: i32, label: i32, to: i32, status: u32) -> Self {
        Self {
            from,
            label,
            to,
            status,
            reserved: 0,
        }
    }

    /// The end-state marker `state -1 -1 1 0`.
    pub fn end_marker(state: i32) -> Self {
        Self {
            from: state,
            label: SENTINEL,
            to: SENTINEL,
            status: ACCEPT_FLAG,
            reserved: 0,
        }
    }

    pub fn is_end_marker(&self) -> bool {
        self.label == SENTINEL && self.to == SENTINEL
    }

    pub fn is_accepting(&self) -> bool {
        self.status & ACCEPT_FLAG != 0
    }
}

fn parse_int(field: &str, line: usize, what: &str) -> Result<i32, FaError> {
    field.parse().map_err(|_| FaError::Parse {
        line,
        reason: format!("invalid {what} \"{field}\""),
    })
}

fn parse_hex(field: &str, line: usize, what: &str) -> Result<u32, FaError> {
    u32::from_str_radix(field, 16).map_err(|_| FaError::Parse {
        line,
        reason: format!("invalid {what} \"{field}\""),
    })
}

/// Parse one non-blank record line (`line` is 1-based, for error messages).
pub fn parse_record(text: &str, line: usize) -> Result<DfaRecord, FaError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if !(4..=5).contains(&fields.len()) {
        return Err(FaError::Parse {
            line,
            reason: format!("expected 4 or 5 fields, found {}", fields.len()),
        });
    }
    let record = DfaRecord {
        from: parse_int(fields[0], line, "state")?,
        label: parse_int(fields[1], line, "label")?,
        to: parse_int(fields[2], line, "destination")?,
        status: parse_hex(fields[3], line, "status")?,
        reserved: match fields.get(4) {
            Some(field) => parse_hex(field, line, "reserved field")?,
            None => 0,
        },
    };
    if record.from < 0 {
        return Err(FaError::Parse {
            line,
            reason: format!("negative state {}", record.from),
        });
    }
    if !record.is_end_marker() && (record.label < 0 || record.to < 0) {
        return Err(FaError::Parse {
            line,
            reason: "negative label or destination outside an end marker".to_string(),
        });
    }
    if let Some(id) = [record.from, record.label, record.to]
        .into_iter()
        .find(|&id| id > MAX_ID)
    {
        return Err(FaError::Parse {
            line,
            reason: format!("id {id} exceeds the limit {MAX_ID}"),
        });
    }
    Ok(record)
}

/// Parse `.dfa` text. Blank lines are skipped; `DFAEND` stops reading.
pub fn parse_records(text: &str) -> Result<Vec<DfaRecord>, FaError> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_text = line.trim();
        if line_text.is_empty() {
            continue;
        }
        if line_text == END_OF_GRAPH {
            break;
        }
        records.push(parse_record(line_text, idx + 1)?);
    }
    Ok(records)
}

/// Render records, one per line.
pub fn render_records(records: &[DfaRecord]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{} {} {} {:x} {:x}\n",
            r.from, r.label, r.to, r.status, r.reserved
        ));
    }
    out
}
