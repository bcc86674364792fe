use clap::{arg_enum, crate_name, crate_version, App, Arg, ArgMatches, SubCommand};
use housesim::gambler::Gambler;
use housesim::global::conf_def;
use housesim::house::{House, HouseConfig, Participation, ProfitRecorder, RoundReport};
use housesim::roster::{self, ConfigError, GamblerSpec};
use housesim::stats::{medrange, MEDRANGE_PCTS};
use housesim::Money;
use rayon::prelude::*;
use serde_json::json;
use std::fmt::Write;

/// Validates the given expression can be parsed as the given type following clap's convention:
/// Return Ok(()) if yes, else Err(string_describing_the_problem)
macro_rules! validate_as {
    ($T:ty, $V:expr) => {
        match $V.parse::<$T>() {
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    };
}

/// Assuming you have previously validated the given expression can be parsed successfully as the
/// give type, this saves a tiny bit of typing and hides the unwrap
macro_rules! parse_as {
    ($T:ty, $V:expr) => {
        $V.parse::<$T>().unwrap()
    };
}

arg_enum! {
    #[derive(PartialEq, Debug, Copy, Clone)]
    enum ParticipationArg {
        Retire,
        Everyone,
    }
}

arg_enum! {
    #[derive(PartialEq, Debug, Copy, Clone)]
    enum SimulateOutFmt {
        Log,
        Rounds,
        ProfitVsTime,
        ProfitMedrange,
    }
}

impl From<ParticipationArg> for Participation {
    fn from(p: ParticipationArg) -> Self {
        match p {
            ParticipationArg::Retire => Participation::Retire,
            ParticipationArg::Everyone => Participation::Everyone,
        }
    }
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn get_roster(args: &ArgMatches) -> Result<Vec<GamblerSpec>, ConfigError> {
    let specs = match args.value_of("roster") {
        Some(fname) => roster::load(fname)?,
        None => roster::classic_specs(),
    };
    // fail on a bad roster before spinning up any simulations
    roster::build(&specs)?;
    Ok(specs)
}

fn round_text(report: &RoundReport, gamblers: &[Box<dyn Gambler>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-----------------------");
    let _ = writeln!(out, "beginning round {}", report.round);
    for game in report.games.iter() {
        let _ = writeln!(out, "playing {} with book:", game.game);
        if let Some(d) = game.drawn {
            let _ = writeln!(out, "drawn: {}", d);
        }
        for o in game.outcomes.iter() {
            let name = gamblers[o.seat].name();
            let _ = writeln!(out, "{} : ${:.2}", name, o.wager);
            if o.won {
                let _ = writeln!(out, "{}: {}. They won: ${:.2}", name, o.call, o.net);
            } else {
                let _ = writeln!(out, "{}: {}. They lost: ${:.2}", name, o.call, -o.net);
            }
        }
    }
    let _ = writeln!(out, "round complete. house made: {:.2}", report.profit_delta);
    let _ = writeln!(out, "total profit: {:.2}", report.total_profit);
    let _ = writeln!(out, "-----------------------");
    out
}

/// Run one house to completion. Returns whatever text the output format wants printed and the
/// cumulative profit after each round.
fn run_one(
    specs: &[GamblerSpec],
    conf: &HouseConfig,
    outfmt: SimulateOutFmt,
) -> Result<(String, Vec<Money>), ConfigError> {
    let mut house = House::new(roster::build(specs)?, conf);
    house.attach_recorder(Box::new(ProfitRecorder::new()));
    log::debug!("starting {}", house);
    let mut text = String::new();
    while !house.is_done() {
        let report = house.simulate_one_round();
        match outfmt {
            SimulateOutFmt::Log => text += &round_text(&report, house.gamblers()),
            SimulateOutFmt::Rounds => {
                let _ = writeln!(text, "{}", json!(report));
            }
            SimulateOutFmt::ProfitVsTime | SimulateOutFmt::ProfitMedrange => {}
        }
    }
    let summary = house.finish();
    if outfmt == SimulateOutFmt::Log {
        text += &summary.to_string();
    }
    let profit: Vec<Money> = serde_json::from_value(house.recorder_output()).unwrap_or_default();
    Ok((text, profit))
}

fn simulate(args: &ArgMatches) -> Result<(), ()> {
    init_logging(args.occurrences_of("verbose"));
    let num_rounds = parse_as!(u32, args.value_of("numrounds").unwrap());
    let num_sims = parse_as!(u32, args.value_of("numsims").unwrap());
    let participation = parse_as!(ParticipationArg, args.value_of("participation").unwrap());
    let outfmt = parse_as!(SimulateOutFmt, args.value_of("outfmt").unwrap());
    let seed = args.value_of("seed").map(|s| parse_as!(u64, s));
    let specs = match get_roster(args) {
        Ok(specs) => specs,
        Err(e) => {
            eprintln!("{}", e);
            return Err(());
        }
    };
    let outputs: Result<Vec<(String, Vec<Money>)>, ConfigError> = (0..num_sims)
        .into_par_iter()
        .map(|i| {
            let conf = HouseConfig {
                max_rounds: num_rounds,
                participation: participation.into(),
                seed: seed.map(|s| s.wrapping_add(i as u64)),
            };
            run_one(&specs, &conf, outfmt)
        })
        .collect();
    let outputs = match outputs {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            return Err(());
        }
    };
    // output differently based on the desired format
    match outfmt {
        SimulateOutFmt::Log | SimulateOutFmt::Rounds => {
            for (text, _) in outputs.iter() {
                print!("{}", text);
            }
        }
        SimulateOutFmt::ProfitVsTime => {
            for (_, profit) in outputs.iter() {
                println!("{}", json!(profit));
            }
        }
        SimulateOutFmt::ProfitMedrange => {
            let sims: Vec<Vec<Money>> = outputs.into_iter().map(|(_, p)| p).collect();
            for (pct, row) in MEDRANGE_PCTS.iter().zip(medrange(&sims).iter()) {
                println!("p{} {:?}", pct, row);
            }
        }
    };
    Ok(())
}

fn print_roster() -> Result<(), ()> {
    match serde_json::to_string_pretty(&roster::classic_specs()) {
        Ok(s) => {
            println!("{}", s);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error serializing roster: {}", e);
            Err(())
        }
    }
}

fn main() {
    let args = App::new(crate_name!())
        .version(crate_version!())
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Run house simulations")
                .arg(
                    Arg::with_name("roster")
                        .long("roster")
                        .value_name("FILE")
                        .help("JSON roster of gamblers. Defaults to the built-in roster"),
                )
                .arg(
                    Arg::with_name("numrounds")
                        .long("num-rounds")
                        .value_name("N")
                        .default_value(conf_def::NUM_ROUNDS)
                        .validator(|v| validate_as!(u32, v))
                        .help("Maximum number of rounds per simulation"),
                )
                .arg(
                    Arg::with_name("numsims")
                        .long("num-sims")
                        .value_name("N")
                        .default_value(conf_def::NUM_SIMS)
                        .validator(|v| validate_as!(u32, v))
                        .help("How many independent simulations to run"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .value_name("SEED")
                        .validator(|v| validate_as!(u64, v))
                        .help("Seed for the first simulation. Later ones use SEED+1, SEED+2, ..."),
                )
                .arg(
                    Arg::with_name("participation")
                        .long("participation")
                        .possible_values(&ParticipationArg::variants())
                        .default_value(conf_def::PARTICIPATION)
                        .case_insensitive(true)
                        .help("Whether gamblers that went bankrupt or hit their target keep playing"),
                )
                .arg(
                    Arg::with_name("outfmt")
                        .long("outfmt")
                        .possible_values(&SimulateOutFmt::variants())
                        .default_value(conf_def::OUTFMT)
                        .case_insensitive(true),
                )
                .arg(
                    Arg::with_name("verbose")
                        .short("v")
                        .multiple(true)
                        .help("Log more (repeat for even more)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("roster")
                .about("Print the built-in roster as JSON, for use as a --roster template"),
        )
        .get_matches();
    let res = if let Some(args) = args.subcommand_matches("simulate") {
        simulate(args)
    } else if args.subcommand_matches("roster").is_some() {
        print_roster()
    } else if args.subcommand_name().is_none() {
        eprintln!("Must provide subcommand");
        Err(())
    } else {
        eprintln!("Unknown subcommand {}", args.subcommand_name().unwrap());
        Err(())
    };
    if res.is_err() {
        std::process::exit(1);
    }
}
