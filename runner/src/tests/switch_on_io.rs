use core::module_path;
use function_name::named;
use scheduler::{IoDoneBehavior, SwitchBehavior};

use super::{config, run, simulate};

#[test]
#[named]
pub fn overlap() {
    let config = config(SwitchBehavior::OnIo, IoDoneBehavior::RunLater, 2);
    let output = simulate(config, &["c2,i,c1", "c3"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn io_heavy() {
    let config = config(SwitchBehavior::OnIo, IoDoneBehavior::RunLater, 3);
    let output = simulate(config, &["c1,i,i,c1", "i,c2", "c3,i"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn all_blocked() {
    let config = config(SwitchBehavior::OnIo, IoDoneBehavior::RunLater, 4);
    let output = simulate(config, &["i", "i"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn zero_length_io() {
    let config = config(SwitchBehavior::OnIo, IoDoneBehavior::RunLater, 0);
    let output = simulate(config, &["i,c1", "c2"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}
