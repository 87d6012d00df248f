use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Opens a plain or gzipped file, or `stdin`.
///
/// ```
/// use std::io::BufRead;
/// let reader = mhg::open_reader("tests/partition/scenario.tsv").unwrap();
/// assert_eq!(reader.lines().count(), 2);
/// ```
pub fn open_reader(input: &str) -> std::io::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path).map_err(|why| {
            std::io::Error::new(
                why.kind(),
                format!("could not open {}: {}", path.display(), why),
            )
        })?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Output that only appears at its destination once [`AtomicWriter::finish`] succeeds.
///
/// Files are staged in a temporary file in the destination directory and renamed into place,
/// so a failed run never leaves a truncated result behind. `stdout` is written directly.
pub enum AtomicWriter {
    Stdout(BufWriter<std::io::Stdout>),
    File {
        temp: BufWriter<NamedTempFile>,
        dest: PathBuf,
    },
}

impl AtomicWriter {
    pub fn create(output: &str) -> std::io::Result<Self> {
        if output == "stdout" {
            return Ok(AtomicWriter::Stdout(BufWriter::new(std::io::stdout())));
        }

        let dest = PathBuf::from(output);
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(dir)?;
        Ok(AtomicWriter::File {
            temp: BufWriter::new(temp),
            dest,
        })
    }

    /// Flushes and moves the staged file to its destination.
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            AtomicWriter::Stdout(mut w) => w.flush(),
            AtomicWriter::File { temp, dest } => {
                let temp = temp.into_inner().map_err(|e| e.into_error())?;
                temp.persist(&dest).map_err(|e| e.error)?;
                Ok(())
            }
        }
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            AtomicWriter::Stdout(w) => w.write(buf),
            AtomicWriter::File { temp, .. } => temp.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            AtomicWriter::Stdout(w) => w.flush(),
            AtomicWriter::File { temp, .. } => temp.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_writer_persists_on_finish() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        let dest_str = dest.to_string_lossy().to_string();

        let mut writer = AtomicWriter::create(&dest_str).unwrap();
        writeln!(writer, "line").unwrap();
        assert!(!dest.exists());
        writer.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "line\n");
    }

    #[test]
    fn test_atomic_writer_dropped_leaves_nothing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        {
            let mut writer = AtomicWriter::create(&dest.to_string_lossy()).unwrap();
            writeln!(writer, "partial").unwrap();
        }
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_open_reader_gz() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hits.tsv.gz");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            writeln!(encoder, "A\tB").unwrap();
            encoder.finish().unwrap();
        }
        let reader = open_reader(&path.to_string_lossy()).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["A\tB".to_string()]);

        assert!(open_reader("tests/partition/not_there.tsv").is_err());
    }
}
