use mlflow::{api::run::RunStatus, timestamp, tracking::{ExperimentBuilder, RunBuilder}, Client, RestClient};
use nanorand::{RNG, WyRand};

fn main() {
    const EXPERIMENT: &str = "My Experiment";
    let mut client = RestClient::new("http://127.0.0.1:5000/api");
    let experiment = client.get_experiment_by_name(EXPERIMENT)
        .map(|experiment| experiment.experiment_id)
        .or_else(|_| ExperimentBuilder::new(&mut client, EXPERIMENT).create())
        .expect("Could neither get nor create the experiment");

    for i in 0..3 {
        println!("Executing run {}", i);
        let mut run = RunBuilder::new(&mut client, experiment.clone())
            .with_param("i", i.to_string())
            .with_param("constant", "42");
        let mut rng = WyRand::new_seed(i);
        for s in 0..10 {
            let int: f64 = rng.generate::<u16>().into();
            let max: f64 = std::u16::MAX.into();
            run = run.with_metric_at("rand", int / max, s, timestamp());
        }
        let run = run.start().expect("Could not start the run");
        client.update_run(&run.info.run_id, RunStatus::Finished, timestamp())
            .expect("Could not finish the run");
    }
}
