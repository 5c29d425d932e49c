use core::module_path;
use function_name::named;
use scheduler::{IoDoneBehavior, SwitchBehavior};

use super::{config, run, simulate};

#[test]
#[named]
pub fn idle_while_blocked() {
    let config = config(SwitchBehavior::OnEnd, IoDoneBehavior::RunLater, 1);
    let output = simulate(config, &["c1,i,c1", "c1"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn sole_survivor() {
    let config = config(SwitchBehavior::OnEnd, IoDoneBehavior::RunLater, 2);
    let output = simulate(config, &["c1", "i,c1"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn mixed() {
    let config = config(SwitchBehavior::OnEnd, IoDoneBehavior::RunLater, 3);
    let output = simulate(config, &["c2,i,c2", "c3,i", "c1"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}
