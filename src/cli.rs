use crate::arbiter::MatchRules;
use crate::engine::EngineSpec;
use crate::game::BoardDims;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub engines: Vec<EngineSpec>,
    pub arbiter: Option<EngineSpec>,
    pub dims: BoardDims,
    pub cycles: u64,
    pub concurrency: u64,
    pub rules: MatchRules,
    pub ledger_root: Option<String>,
    pub rand_seed: Option<u64>,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            engines: vec![],
            arbiter: None,
            dims: BoardDims::default(),
            cycles: 1,
            concurrency: 1,
            rules: MatchRules::default(),
            ledger_root: None,
            rand_seed: None,
        }
    }
}

fn parse_engine_option(spec: &mut EngineSpec, name: &str, value: &str) -> bool {
    if let Some(param) = name.strip_prefix("param.") {
        return match spec.params.set(param, value) {
            Ok(()) => true,
            Err(message) => {
                eprintln!("{message}");
                false
            }
        };
    }

    match name {
        "name" => {
            spec.name = String::from(value);
        }
        "cmd" => {
            spec.cmd = String::from(value);
        }
        "dir" => {
            spec.dir = String::from(value);
        }
        "ai" => {
            spec.ai = String::from(value);
        }
        _ => {
            dbg!(&name);
            dbg!(&value);
        }
    }
    true
}

pub fn parse() -> Option<CliOptions> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut options = CliOptions::default();
    let mut each_options = Vec::<(String, String)>::new();

    let mut it = args.iter().peekable();
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "-version" | "--version" => {
                println!("footballtest version {}", env!("CARGO_PKG_VERSION"));
                return None;
            }

            "-engine" => {
                let mut engine = EngineSpec::default();
                while let Some(option) = it.peek()
                    && !option.starts_with("-")
                    && let Some((name, value)) = option.split_once('=')
                {
                    it.next(); // consume token

                    if !parse_engine_option(&mut engine, name, value) {
                        return None;
                    }
                }
                if engine.cmd.is_empty() {
                    eprintln!("cmd required for -engine option");
                    return None;
                }
                options.engines.push(engine);
            }

            "-arbiter" => {
                if options.arbiter.is_some() {
                    eprintln!("Duplicate -arbiter flag");
                    return None;
                }

                let mut arbiter = EngineSpec::default();
                while let Some(option) = it.peek()
                    && !option.starts_with("-")
                    && let Some((name, value)) = option.split_once('=')
                {
                    it.next(); // consume token

                    if !parse_engine_option(&mut arbiter, name, value) {
                        return None;
                    }
                }
                if arbiter.cmd.is_empty() {
                    eprintln!("cmd required for -arbiter option");
                    return None;
                }
                options.arbiter = Some(arbiter);
            }

            "-each" => {
                while let Some(option) = it.peek()
                    && !option.starts_with("-")
                    && let Some((name, value)) = option.split_once('=')
                {
                    it.next(); // consume token

                    each_options.push((name.to_string(), value.to_string()));
                }
            }

            "-board" => {
                while let Some(option) = it.peek()
                    && !option.starts_with("-")
                    && let Some((name, value)) = option.split_once('=')
                {
                    it.next(); // consume token

                    let Ok(parsed) = value.parse::<u32>() else {
                        eprint!("invalid board value {value} for {name} (must be unsigned integer)");
                        return None;
                    };
                    if parsed == 0 {
                        eprint!("invalid board value {value} for {name} (must be bigger than zero)");
                        return None;
                    }
                    match name {
                        "width" => options.dims.width = parsed,
                        "height" => options.dims.height = parsed,
                        "goal" => options.dims.goal_width = parsed,
                        "freekick" => options.dims.free_kick = parsed,
                        _ => {
                            dbg!(&name);
                            dbg!(&value);
                        }
                    }
                }
            }

            "-cycles" => {
                let Some(option) = it.next() else { break };
                if let Ok(option) = option.parse::<u64>() {
                    if option == 0 {
                        eprint!("invalid cycles value {option} (must be bigger than zero)");
                        return None;
                    }
                    options.cycles = option;
                } else {
                    eprint!("invalid cycles value {option} (must be unsigned integer)");
                    return None;
                }
            }

            "-concurrency" => {
                let Some(option) = it.next() else { break };
                if let Ok(option) = option.parse::<u64>() {
                    if option == 0 {
                        eprint!("invalid concurrency value {option} (must be bigger than zero)");
                        return None;
                    }
                    options.concurrency = option;
                } else {
                    eprint!("invalid concurrency value {option} (must be unsigned integer)");
                    return None;
                }
            }

            "-plycap" => {
                let Some(option) = it.next() else { break };
                if let Ok(option) = option.parse::<u64>() {
                    if option == 0 {
                        eprint!("invalid plycap value {option} (must be bigger than zero)");
                        return None;
                    }
                    options.rules.ply_cap = option;
                } else {
                    eprint!("invalid plycap value {option} (must be unsigned integer)");
                    return None;
                }
            }

            "-commentary" => {
                let Some(option) = it.next() else { break };
                options.rules.commentary = match option.as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        eprint!("invalid commentary value {option} (must be true or false)");
                        return None;
                    }
                };
            }

            "-ledger" => {
                let mut root = String::new();
                while let Some(option) = it.peek()
                    && !option.starts_with("-")
                    && let Some((name, value)) = option.split_once('=')
                {
                    it.next(); // consume token

                    match name {
                        "dir" => {
                            root = String::from(value);
                        }
                        _ => {
                            dbg!(&name);
                            dbg!(&value);
                        }
                    }
                }
                if root.is_empty() {
                    eprintln!("output directory required for -ledger option");
                    return None;
                }
                options.ledger_root = Some(root);
            }

            "-srand" => {
                let Some(option) = it.next() else { break };
                if let Ok(option) = option.parse::<u64>() {
                    options.rand_seed = Some(option);
                } else {
                    eprint!("invalid random seed {option} (must be unsigned integer)");
                    return None;
                }
            }

            _ => {
                dbg!(&flag);
            }
        }
    }

    for (name, value) in each_options {
        for engine in &mut options.engines {
            if !parse_engine_option(engine, &name, &value) {
                return None;
            }
        }
    }

    Some(options)
}
