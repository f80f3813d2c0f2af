use replwire_session::protocol;

use crate::cmd::VersionArgs;
use crate::exit::{session_error, CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("replwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let registry = protocol::registry().map_err(|err| session_error("registry", err))?;

    println!("name: replwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("statuses: {}", registry.statuses().join(", "));

    Ok(SUCCESS)
}
