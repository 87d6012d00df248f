use crate::libs::error::{MhgError, Result};
use crate::libs::interval::Interval;
use std::io::BufRead;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// Composes two relative strands: plus is the identity, minus flips.
    pub fn compose(self, other: Strand) -> Strand {
        if self == other {
            Strand::Plus
        } else {
            Strand::Minus
        }
    }

    pub fn sign(self) -> i64 {
        match self {
            Strand::Plus => 1,
            Strand::Minus => -1,
        }
    }
}

/// One local alignment between a query and a subject sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub query: String,
    pub subject: String,
    pub query_range: Interval,
    pub subject_range: Interval,
    pub bitscore: f64,
    pub strand: Strand,
}

impl HitRecord {
    pub fn is_self(&self) -> bool {
        self.query == self.subject
    }

    fn sort_key(&self) -> (&str, &str, Interval, Interval, Strand) {
        (
            &self.query,
            &self.subject,
            self.query_range,
            self.subject_range,
            self.strand,
        )
    }

    /// Total order used to make graph construction independent of input order
    pub fn cmp_key(&self, other: &HitRecord) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then(self.bitscore.total_cmp(&other.bitscore))
    }
}

/// Parses one BLAST tabular line (`-outfmt 6`, standard 12 columns).
///
/// ```
/// use mhg::libs::hit::{parse_line, Strand};
/// let hit = parse_line("A\tB\t98.5\t41\t0\t0\t10\t50\t60\t20\t1e-10\t100", "-", 1).unwrap();
/// assert_eq!(hit.strand, Strand::Minus);
/// assert_eq!(hit.subject_range.start, 20);
/// assert_eq!(hit.bitscore, 100.0);
/// ```
pub fn parse_line(line: &str, file: &str, line_no: usize) -> Result<HitRecord> {
    let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
    if fields.len() < 12 {
        return Err(MhgError::parse(
            file,
            line_no,
            format!("expected 12 tab-separated columns, found {}", fields.len()),
        ));
    }

    let coord = |idx: usize, name: &str| -> Result<u64> {
        let value = fields[idx].parse::<u64>().map_err(|_| {
            MhgError::parse(file, line_no, format!("invalid {}: {:?}", name, fields[idx]))
        })?;
        if value == 0 {
            return Err(MhgError::parse(
                file,
                line_no,
                format!("{} must be 1-based, got 0", name),
            ));
        }
        Ok(value)
    };

    let q_start = coord(6, "qstart")?;
    let q_end = coord(7, "qend")?;
    let s_start = coord(8, "sstart")?;
    let s_end = coord(9, "send")?;

    let bitscore = fields[11]
        .parse::<f64>()
        .map_err(|_| MhgError::parse(file, line_no, format!("invalid bitscore: {:?}", fields[11])))?;
    if !bitscore.is_finite() || bitscore < 0.0 {
        return Err(MhgError::parse(
            file,
            line_no,
            format!("bitscore out of range: {}", bitscore),
        ));
    }

    if fields[0].is_empty() || fields[1].is_empty() {
        return Err(MhgError::parse(file, line_no, "empty sequence id"));
    }

    let strand = if (q_start > q_end) != (s_start > s_end) {
        Strand::Minus
    } else {
        Strand::Plus
    };

    Ok(HitRecord {
        query: fields[0].to_string(),
        subject: fields[1].to_string(),
        query_range: Interval::from_pair(q_start, q_end),
        subject_range: Interval::from_pair(s_start, s_end),
        bitscore,
        strand,
    })
}

/// Reads all hits of one report. Comment lines (`-outfmt 7`) and blank lines are skipped.
pub fn read_hits<R: BufRead>(reader: R, file: &str) -> Result<Vec<HitRecord>> {
    let mut hits = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        hits.push(parse_line(&line, file, i + 1)?);
    }
    Ok(hits)
}

/// Expands directories into their regular, non-hidden files, sorted by name.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<String>> {
    let mut files = vec![];
    for input in inputs {
        let path = Path::new(input);
        if input != "stdin" && path.is_dir() {
            let mut entries: Vec<PathBuf> = vec![];
            for entry in std::fs::read_dir(path)? {
                let p = entry?.path();
                let hidden = p
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with('.'))
                    .unwrap_or(true);
                if p.is_file() && !hidden {
                    entries.push(p);
                }
            }
            entries.sort();
            files.extend(entries.iter().map(|p| p.to_string_lossy().to_string()));
        } else {
            files.push(input.to_string());
        }
    }
    Ok(files)
}

/// Loads every hit from the given report files and directories.
pub fn load_hits(inputs: &[String]) -> Result<Vec<HitRecord>> {
    let mut hits = vec![];
    for file in expand_inputs(inputs)? {
        let reader = crate::open_reader(&file)?;
        let mut part = read_hits(reader, &file)?;
        log::debug!("{}: {} hits", file, part.len());
        hits.append(&mut part);
    }
    Ok(hits)
}
