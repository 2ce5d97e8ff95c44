use docopt::Docopt;
use manet_sim_cli::{RunConfig, RunController, write_final_record};
use manet_sim_models::ProtocolKind;
use serde::Deserialize;
use slog::Drain;
use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

const USAGE: &str = "
MANET routing simulator.

Usage:
    manet-sim [options]
    manet-sim --help

Options:
    -h, --help                  Show this message.
    -n, --num-nodes N           Number of mobile nodes [default: 50].
    -a, --area-size SIZE        Square arena side, in metres [default: 1000].
    -p, --protocol PROTO        Routing protocol: aodv, dsdv, dsr, olsr [default: aodv].
    -t, --sim-time SECS         Simulated horizon, in seconds [default: 60].
    -l, --traffic-load RATE     Packets/second of simulated time [default: 10].
    -s, --node-speed SPEED      Node speed, in m/s [default: 5].
    -r, --tx-range RANGE        Transmission range, in metres [default: 100].
    --pause-time SECS           Waypoint pause, in seconds [default: 2].
    --seed SEED                 RNG seed, for reproducible runs.
    --history-dir DIR           If set, write the final record as JSON under this directory.
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_help: bool,
    flag_num_nodes: usize,
    flag_area_size: f64,
    flag_protocol: String,
    flag_sim_time: f64,
    flag_traffic_load: f64,
    flag_node_speed: f64,
    flag_tx_range: f64,
    flag_pause_time: f64,
    flag_seed: Option<u64>,
    flag_history_dir: Option<String>,
}

fn parse_protocol(raw: &str) -> Result<ProtocolKind, String> {
    match raw.to_ascii_uppercase().as_str() {
        "AODV" => Ok(ProtocolKind::Aodv),
        "DSDV" => Ok(ProtocolKind::Dsdv),
        "DSR" => Ok(ProtocolKind::Dsr),
        "OLSR" => Ok(ProtocolKind::Olsr),
        other => Err(format!("unrecognized protocol '{other}'")),
    }
}

fn build_logger() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, slog::o!())
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if args.flag_help {
        print!("{USAGE}");
        return;
    }

    let protocol = match parse_protocol(&args.flag_protocol) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {msg}\n\n{USAGE}");
            process::exit(1);
        }
    };

    let config = RunConfig {
        num_nodes: args.flag_num_nodes,
        area_size: args.flag_area_size,
        protocol,
        sim_time: args.flag_sim_time,
        traffic_load: args.flag_traffic_load,
        node_speed: args.flag_node_speed,
        tx_range: args.flag_tx_range,
        pause_time: args.flag_pause_time,
        seed: args.flag_seed,
    };

    let log = build_logger();
    let run_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut controller = match RunController::new(config, run_id, log.clone()) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let history_dir = args.flag_history_dir.map(PathBuf::from);
    let mut final_record = None;

    controller.run(|record| {
        if record.is_final() {
            final_record = Some(record.clone());
        } else {
            match serde_json::to_string(&record) {
                Ok(line) => println!("{line}"),
                Err(e) => slog::error!(log, "failed to serialize emission record"; "error" => %e),
            }
        }
    });

    if let Some(record) = final_record {
        match serde_json::to_string(&record) {
            Ok(line) => println!("{line}"),
            Err(e) => slog::error!(log, "failed to serialize final record"; "error" => %e),
        }
        if let Some(dir) = history_dir {
            if let Err(e) = write_final_record(&dir, run_id, &record) {
                slog::error!(log, "failed to write history record"; "error" => %e);
            }
        }
    }
}
