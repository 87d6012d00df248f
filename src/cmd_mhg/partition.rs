use anyhow::Context;
use clap::*;
use mhg::libs::block::write_mhgs;
use mhg::libs::filter::filter_edges;
use mhg::libs::graph::{AlignmentGraph, BuildOpt};
use mhg::libs::hit::load_hits;
use mhg::libs::partition::{partition, PartitionOpt};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("partition")
        .about("Partition pairwise alignment hits into Maximal Homologous Groups")
        .after_help(
            r###"
Builds an alignment graph from pairwise blastn hits and splits it into MHGs, maximal
groups of intervals sharing one history without internal rearrangement.

Input:
* BLAST tabular reports (-outfmt 6 or 7, standard 12 columns), plain or gzipped
* Directories are expanded to the files they contain
* BLAST XML reports (-outfmt 5) are not accepted; rerun blastn with -outfmt 6

Process:
1. Overlapping or adjacent hit intervals on one sequence are merged into nodes
2. Every hit becomes an edge between the nodes of its query and subject
3. An edge is kept if bitscore >= threshold * best bitscore of its query sequence
4. Connected components are split until each is collinear in order and orientation

Output:
* One MHG per line, blocks as ((accession,(union_start,union_end)),(homology_start,homology_end),direction)

Notes:
* Self hits and hits shorter than --min-len are ignored
* --max-shift is the positional disagreement tolerated before two placements conflict
* The output file is written atomically

Examples:
1. Partition all reports in a directory:
   mhg partition blastn_out/ -o mhg.txt

2. Stricter homology, 8 threads:
   mhg partition blastn_out/ -t 0.98 -p 8 -o mhg.txt

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Report files or directories. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .short('t')
                .num_args(1)
                .default_value("0.95")
                .value_parser(value_parser!(f64))
                .help("Keep hits scoring at least this fraction of their query's best bitscore"),
        )
        .arg(
            Arg::new("min_len")
                .long("min-len")
                .num_args(1)
                .default_value("20")
                .value_parser(value_parser!(u64))
                .help("Ignore hits spanning fewer bases"),
        )
        .arg(
            Arg::new("max_shift")
                .long("max-shift")
                .num_args(1)
                .default_value("50")
                .value_parser(value_parser!(u64))
                .help("Tolerated positional disagreement in bases"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Number of threads for partitioning components"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infiles: Vec<String> = args
        .get_many::<String>("infiles")
        .unwrap()
        .cloned()
        .collect();
    let outfile = args.get_one::<String>("outfile").unwrap();

    let opt_threshold = *args.get_one::<f64>("threshold").unwrap();
    if !(opt_threshold > 0.0 && opt_threshold <= 1.0) {
        anyhow::bail!("--threshold must be in (0, 1], got {}", opt_threshold);
    }
    let build_opt = BuildOpt {
        min_len: *args.get_one::<u64>("min_len").unwrap(),
    };
    let partition_opt = PartitionOpt {
        max_shift: *args.get_one::<u64>("max_shift").unwrap(),
    };
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();

    //----------------------------
    // Ops
    //----------------------------
    let hits = load_hits(&infiles).context("reading alignment reports")?;
    log::info!("{} hits loaded", hits.len());

    let mut graph = AlignmentGraph::build(hits, &build_opt);
    filter_edges(&mut graph, opt_threshold);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build()?;
    let mhgs = pool.install(|| partition(&graph, &partition_opt))?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = mhg::AtomicWriter::create(outfile)
        .with_context(|| format!("creating {}", outfile))?;
    write_mhgs(&mut writer, &mhgs)?;
    writer.finish()?;

    Ok(())
}
