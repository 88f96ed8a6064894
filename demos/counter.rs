use clap::{Parser, ValueEnum};

use bounded_rs::checker::{BoundedChecker, CheckerConfig, Verdict};
use bounded_rs::expr::Expr;
use bounded_rs::solver::BddSolver;
use bounded_rs::system::MonolithicSystem;
use bounded_rs::types::Var;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Schedule {
    /// BMC, k-induction and IMC in every iteration.
    All,
    /// BMC only.
    Bmc,
    /// BMC followed by k-induction.
    Kind,
    /// IMC only.
    Imc,
}

/// Checks `x < limit` for the counter `x := 0; loop { x := x + step }`.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Upper bound in the property `x < limit`.
    #[arg(value_name = "INT", default_value = "5")]
    limit: i64,

    /// Increment per step (0 makes the counter stutter).
    #[arg(long, value_name = "INT", default_value = "1")]
    step: i64,

    /// Width of the counter, in bits.
    #[arg(long, value_name = "INT", default_value = "8", value_parser = clap::value_parser!(u32).range(1..=32))]
    width: u32,

    /// Which strategies to run.
    #[arg(long, value_enum, default_value = "all")]
    schedule: Schedule,

    /// Give up after this many iterations.
    #[arg(long, value_name = "INT")]
    max_iterations: Option<usize>,

    /// Do not restrict the search to loop-free paths.
    #[arg(long)]
    no_lf: bool,

    /// BDD size (in bits, so the actual size is `2^size` nodes).
    #[arg(long, value_name = "INT", default_value = "16")]
    size: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let x = Var::int("x", args.width);
    let system = MonolithicSystem::new(
        Expr::eq(Expr::var(&x), Expr::int(0)),
        Expr::eq(
            Expr::prime(Expr::var(&x)),
            Expr::add(Expr::var(&x), Expr::int(args.step)),
        ),
        Expr::lt(Expr::var(&x), Expr::int(args.limit)),
    );
    println!("init  = {}", system.init);
    println!("trans = {}", system.trans);
    println!("prop  = {}", system.prop);

    let mut config = match args.schedule {
        Schedule::All => CheckerConfig::default(),
        Schedule::Bmc => CheckerConfig::bmc_only(),
        Schedule::Kind => CheckerConfig::kind(),
        Schedule::Imc => CheckerConfig::imc_only(),
    };
    if let Some(n) = args.max_iterations {
        config = config.max_iterations(n);
    }
    let lf = !args.no_lf;
    config = config.lf_path_only(move || lf);

    let checker = BoundedChecker::explicit(system)
        .config(config)
        .bmc_solver(BddSolver::with_storage_bits(args.size))
        .kind_solver(BddSolver::with_storage_bits(args.size))
        .imc_solver(BddSolver::with_storage_bits(args.size))
        .build()?;

    let verdict = checker.run()?;
    println!("{}", verdict);
    if let Verdict::Unsafe { trace, .. } = &verdict {
        print!("{}", trace);
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_width_range() {
        assert_eq!(Cli::try_parse_from(["counter"]).unwrap().width, 8);
        assert_eq!(Cli::try_parse_from(["counter", "--width", "1"]).unwrap().width, 1);
        assert_eq!(Cli::try_parse_from(["counter", "--width", "32"]).unwrap().width, 32);
        assert!(Cli::try_parse_from(["counter", "--width", "0"]).is_err());
        assert!(Cli::try_parse_from(["counter", "--width", "33"]).is_err());
    }
}
