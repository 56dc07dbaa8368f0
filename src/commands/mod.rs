pub type CmdResult<T> = resignal::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod convert;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (resignal::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Convert(args) => dispatch!(args, global, convert),
    }
}
