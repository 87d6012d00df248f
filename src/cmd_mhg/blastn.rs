use anyhow::Context;
use clap::*;
use rayon::prelude::*;
use std::path::Path;
use tempfile::NamedTempFile;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("blastn")
        .about("All-vs-all blastn between genomes")
        .after_help(
            r###"
Runs blastn for every ordered pair of distinct genomes and writes tabular reports
(-outfmt 6) ready for `mhg partition`.

* Each genome is a FASTA file
* A report is named <query>vs<subject>.tsv, after the file stems
* Both directions of a pair are aligned, so every genome gets its own best hits
* Reports are only moved into place after blastn exits successfully

Examples:
    # Three genomes, six reports
    mhg blastn a.fa b.fa c.fa -o blastn_out

    # Extra blastn options
    mhg blastn a.fa b.fa --blastn-args "-evalue 1e-10 -word_size 20"

"###,
        )
        .arg(
            Arg::new("genomes")
                .required(true)
                .num_args(2..)
                .index(1)
                .help("Genome FASTA files"),
        )
        .arg(
            Arg::new("blastn_args")
                .long("blastn-args")
                .allow_hyphen_values(true)
                .help("Additional arguments passed directly to blastn"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .default_value("blastn_out")
                .help("Output directory"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .default_value("4")
                .help("Number of parallel threads"),
        )
}

fn file_stem(path: &str) -> anyhow::Result<String> {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid genome path: {}", path))
}

fn run_pair(query: &str, subject: &str, extra: &[String], outdir: &Path) -> anyhow::Result<()> {
    let q_base = file_stem(query)?;
    let s_base = file_stem(subject)?;
    let out_path = outdir.join(format!("{}vs{}.tsv", q_base, s_base));

    let temp = NamedTempFile::new_in(outdir)?;
    let status = std::process::Command::new("blastn")
        .arg("-query")
        .arg(query)
        .arg("-subject")
        .arg(subject)
        .arg("-outfmt")
        .arg("6")
        .args(extra)
        .stdout(temp.reopen()?)
        .status()
        .with_context(|| format!("executing blastn for {} vs {}", q_base, s_base))?;

    if !status.success() {
        anyhow::bail!("blastn failed for {} vs {}: {}", q_base, s_base, status);
    }
    temp.persist(&out_path)?;
    log::info!("Finished: {} vs {}", q_base, s_base);

    Ok(())
}

pub fn execute(matches: &ArgMatches) -> anyhow::Result<()> {
    let genomes: Vec<&String> = matches.get_many::<String>("genomes").unwrap().collect();
    let extra: Vec<String> = matches
        .get_one::<String>("blastn_args")
        .map(|s| s.split_whitespace().map(|a| a.to_string()).collect())
        .unwrap_or_default();
    let output_dir = Path::new(matches.get_one::<String>("output").unwrap());
    let parallel = *matches.get_one::<usize>("parallel").unwrap();

    // Check if blastn is installed
    if which::which("blastn").is_err() {
        anyhow::bail!("blastn not found in PATH. Please install BLAST+ first.");
    }

    std::fs::create_dir_all(output_dir)?;

    let mut pairs = vec![];
    for (i, query) in genomes.iter().enumerate() {
        for (j, subject) in genomes.iter().enumerate() {
            if i != j {
                pairs.push((query.as_str(), subject.as_str()));
            }
        }
    }
    log::info!("{} genomes, {} pairwise alignments", genomes.len(), pairs.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel)
        .build()?;

    pool.install(|| {
        pairs
            .par_iter()
            .map(|(query, subject)| run_pair(query, subject, &extra, output_dir))
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    Ok(())
}
