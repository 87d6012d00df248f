extern crate clap;
use clap::*;
use log::LevelFilter;

mod cmd_mhg;

fn main() -> anyhow::Result<()> {
    let app = Command::new("mhg")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`mhg` - Maximal Homologous Groups from pairwise genome alignments")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Increase logging verbosity (-v debug, -vv trace)"),
        )
        .subcommand(cmd_mhg::blastn::make_subcommand())
        .subcommand(cmd_mhg::partition::make_subcommand())
        .subcommand(cmd_mhg::stat::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Alignments:
    * blastn    - All-vs-all pairwise blastn between genomes

* Groups:
    * partition - Partition pairwise hits into MHGs
    * stat      - Summarize an MHG file

"###,
        );

    let matches = app.get_matches();

    let filter_level = match matches.get_count("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("blastn", sub_matches)) => cmd_mhg::blastn::execute(sub_matches),
        Some(("partition", sub_matches)) => cmd_mhg::partition::execute(sub_matches),
        Some(("stat", sub_matches)) => cmd_mhg::stat::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
