use std::env;
use std::fs;

use processor::{format_logs, format_stats, Recorder};
use scheduler::{round_robin, Config, IoDoneBehavior, SwitchBehavior};

mod io_immediate;
mod switch_on_end;
mod switch_on_io;

fn write_logs(folder: &str, name: &str, logs: &str) {
    fs::create_dir_all(format!("../outputs/{folder}")).unwrap();
    fs::write(format!("../outputs/{folder}/{name}.log"), logs).unwrap();
}

fn read_logs(folder: &str, name: &str) -> String {
    fs::read_to_string(format!("../outputs/{folder}/{name}.log")).unwrap()
}

fn run(folder: &str, name: &str, output: &str) {
    if env::var("WRITE_OUTPUT").is_ok() {
        write_logs(folder, name, output);
    } else {
        let reference = read_logs(folder, name);

        println!("\nleft = Correct Output\nright = Your Output\n");
        use pretty_assertions::assert_eq;
        assert_eq!(reference, output);
    }
}

fn config(switch: SwitchBehavior, io_done: IoDoneBehavior, io_length: usize) -> Config {
    Config::default()
        .with_switch(switch)
        .with_io_done(io_done)
        .with_io_length(io_length)
}

/// Runs `programs` to completion and renders the trace followed by the stats.
fn simulate(config: Config, programs: &[&str]) -> String {
    let mut scheduler = round_robin(config);
    for program in programs {
        scheduler.load_program(program).unwrap();
    }

    let (header, logs, stats) = Recorder::run(&mut scheduler).unwrap();
    format!("{}{}", format_logs(&header, &logs), format_stats(&stats))
}
