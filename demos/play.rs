use anyhow::Result;
use mlflow::{
    api::{
        error::{BuildError, CreateError, GetError},
        run::RunStatus,
    },
    timestamp,
    tracking::{log_trace, trace::span_type, ExperimentBuilder, RunBuilder, TraceBuilder},
    Client, ClientConfig, RestClient,
};
use nanorand::{WyRand, RNG};
use tracing_subscriber::EnvFilter;

struct Args {
    experiment: String,
    create: bool,
    runs: u32,
    trace: bool,
}

impl Args {
    pub fn from_env() -> Result<Self> {
        let mut args = pico_args::Arguments::from_env();
        Ok(Args {
            experiment: args.value_from_str(["-e", "--experiment"])?,
            create: args.contains(["-c", "--create"]),
            runs: args.opt_value_from_str(["-r", "--runs"])?.unwrap_or(1),
            trace: args.contains(["-t", "--trace"]),
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::from_env()?;
    let config = ClientConfig::load()?;
    let mut client = RestClient::from_config(&config);
    let experiment = if args.create {
        let experiment_id = ExperimentBuilder::new(&mut client, args.experiment.as_str())
            .with_tag("created_by", "play")
            .create();
        match experiment_id {
            Ok(experiment_id) => {
                println!("Experiment with id {} was created successfully!", experiment_id);
                experiment_id
            }
            Err(BuildError::Create(CreateError::AlreadyExists(name))) => {
                println!("The experiment {} already exists.", name);
                println!("Run again without the -c or --create flag to fetch the existing experiment.");
                return Ok(());
            }
            Err(err) => {
                println!("Failed to create experiment:\n {}", err);
                return Ok(());
            }
        }
    } else {
        match client.get_experiment_by_name(&args.experiment) {
            Ok(experiment) => {
                println!(
                    "Experiment {} with id {} was fetched successfully!",
                    experiment.name, experiment.experiment_id,
                );
                experiment.experiment_id
            }
            Err(GetError::DoesNotExist(name)) => {
                println!("The experiment {} does not exists.", name);
                println!("Run again with the -c or --create flag to create a new experiment.");
                return Ok(());
            }
            Err(err) => {
                println!("Failed to get experiment:\n {}", err);
                return Ok(());
            }
        }
    };

    for i in 0..args.runs {
        println!("Executing run {}", i);
        let mut run = RunBuilder::new(&mut client, experiment.clone())
            .with_name(format!("play-{}", i))
            .with_param("i", i.to_string())
            .with_param("constant", "42");
        let mut rng = WyRand::new_seed(i.into());
        for s in 0..10 {
            let int: f64 = rng.generate::<u16>().into();
            let max: f64 = std::u16::MAX.into();
            run = run.with_metric_at("rand", int / max, s, timestamp());
        }
        let run = run.start()?;
        let rand = run.data.metrics.get_by_key("rand");
        if let (Some(average), Some(range)) = (rand.average("rand"), rand.min_max("rand")) {
            println!("rand: average {:.3}, min {:.3}, max {:.3}", average, range.min, range.max);
        }
        client.update_run(&run.info.run_id, RunStatus::Finished, timestamp())?;
    }

    if args.trace {
        let trace = TraceBuilder::new(experiment).with_tag("source", "play");
        let root = trace
            .start_span("answer", span_type::CHAIN)
            .with_input("question", "What is 6 * 7?");
        trace
            .start_span("multiply", span_type::TOOL)
            .with_parent(root.span_id())
            .with_input("a", 6)
            .with_input("b", 7)
            .with_output("product", 42)
            .end();
        root.with_output("answer", "42").end();
        let info = log_trace(&mut client, &trace.build())?;
        println!("Trace {} was logged with state {:?}", info.trace_id, info.state);
    }

    Ok(())
}
