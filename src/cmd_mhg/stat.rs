use clap::*;
use indexmap::IndexMap;
use mhg::libs::block::Mhg;
use std::io::{BufRead, Write};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("stat")
        .about("Basic statistics of MHG files")
        .after_help(
            r###"
Reports one row per MHG:

* mhg       - 1-based line number of the MHG
* blocks    - number of blocks
* sequences - number of distinct accessions
* length    - homologous bases, overlapping blocks of one accession counted once

Input files can be gzipped. If the input file is 'stdin', data is read from standard input.

Examples:
1. Statistics of a partition:
   mhg stat mhg.txt

2. Output results to a file:
   mhg stat mhg.txt -o mhg.stat.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input MHG file to process"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let reader = mhg::open_reader(infile)?;
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let field_names = ["mhg", "blocks", "sequences", "length"];

    //----------------------------
    // Operating
    //----------------------------
    writer.write_all(format!("{}\n", field_names.join("\t")).as_ref())?;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let group: Mhg = line
            .parse()
            .map_err(|e| anyhow::anyhow!("{}:{}: {}", infile, i + 1, e))?;

        let mut ints_of: IndexMap<&str, intspan::IntSpan> = IndexMap::new();
        for block in &group.blocks {
            let (start, end) = match (
                i32::try_from(block.homology.start),
                i32::try_from(block.homology.end),
            ) {
                (Ok(start), Ok(end)) => (start, end),
                _ => anyhow::bail!(
                    "{}:{}: coordinates of {} exceed {}",
                    infile,
                    i + 1,
                    block.accession,
                    i32::MAX
                ),
            };
            ints_of
                .entry(block.accession.as_str())
                .or_insert_with(intspan::IntSpan::new)
                .add_pair(start, end);
        }
        let length: i32 = ints_of.values().map(|ints| ints.cardinality()).sum();

        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\n",
            i + 1,
            group.blocks.len(),
            ints_of.len(),
            length
        ))?;
    }

    Ok(())
}
