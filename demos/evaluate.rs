//! Render a docklett template for two build targets.

use docklett::{Environment, Value};

const TEMPLATE: &str = "\
@SET release = TARGET == \"prod\"

FROM rust:1.85 AS build
WORKDIR /src
COPY . .
@IF release
RUN cargo build --release
@ELSE
RUN cargo build
@END

FROM debian:bookworm-slim
@IF !release
RUN apt-get update && apt-get install -y gdb
@END
CMD [\"/usr/local/bin/app\"]
";

fn main() {
    for target in ["prod", "dev"] {
        let mut environment = Environment::new();
        environment.define("TARGET", Value::from(target));

        println!("# TARGET={target}");
        match docklett::run_with(TEMPLATE, "Dockerfile.dkl", environment) {
            Ok(lines) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Err(e) => eprintln!("{e}"),
        }
        println!();
    }

    // Canonical formatting of the same template
    match docklett::parse_str(TEMPLATE, "Dockerfile.dkl") {
        Ok(statements) => print!("{}", docklett::format(&statements)),
        Err(e) => eprintln!("{e}"),
    }
}
