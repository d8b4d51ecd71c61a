use footballtest::runner::Runner;
use footballtest::{cli, tournament};
use log::info;

fn main() -> std::io::Result<()> {
    flexi_logger::Logger::try_with_env().unwrap().start().ok();

    let Some(options) = cli::parse() else {
        return Ok(());
    };
    info!("{:#?}", &options);

    if options.engines.len() < 2 {
        eprintln!("We require at least two engines to be supplied.");
        return Ok(());
    }

    let engine_names: Vec<String> = options
        .engines
        .iter()
        .map(|e| e.display_name().to_string())
        .collect();

    let mut tournament: Box<dyn tournament::Tournament> = Box::new(tournament::RoundRobin::new(
        options.engines.len(),
        options.cycles,
    ));

    if let Some(root) = &options.ledger_root {
        tournament = Box::new(tournament::LedgerOutWrapper::new(
            tournament,
            root,
            options.dims,
        )?);
    }

    tournament = Box::new(tournament::ReporterWrapper::new(tournament, engine_names));

    let runner = Runner {
        engines: options.engines,
        arbiter: options.arbiter,
        dims: options.dims,
        rules: options.rules,
        concurrency: options.concurrency,
        rand_seed: options.rand_seed,
    };
    runner.run(tournament);

    Ok(())
}
