use core::module_path;
use function_name::named;
use scheduler::{IoDoneBehavior, SwitchBehavior};

use super::{config, run, simulate};

#[test]
#[named]
pub fn preempt() {
    let config = config(SwitchBehavior::OnIo, IoDoneBehavior::RunImmediate, 1);
    let output = simulate(config, &["c1,i,c3", "c4"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn switch_on_end() {
    let config = config(SwitchBehavior::OnEnd, IoDoneBehavior::RunImmediate, 2);
    let output = simulate(config, &["c2,i,c2", "c4"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}

#[test]
#[named]
pub fn staggered() {
    let config = config(SwitchBehavior::OnIo, IoDoneBehavior::RunImmediate, 3);
    let output = simulate(config, &["i,c2", "i,c2", "c1,i"]);

    run(
        module_path!().split("::").last().unwrap(),
        function_name!(),
        &output,
    );
}
