//! Demonstrate error handling for invalid docklett input.

use docklett::Error;

fn show(name: &str, source: &str) {
    match docklett::run_str(source, name) {
        Ok(lines) => println!("{name}: ran OK, {} line(s)", lines.len()),
        Err(Error::Scan(errors)) => {
            println!("{name}: {} scan error(s)", errors.len());
            for e in &errors {
                println!("  Kind: {:?}", e.kind);
                println!("  Location: line {}, column {}", e.position.line, e.position.column);
            }
        }
        Err(Error::Parse(errors)) => {
            println!("{name}: {} parse error(s)", errors.len());
            for e in &errors {
                println!("  {e}");
            }
        }
        Err(e @ Error::Runtime(_)) => {
            println!("{name}: runtime error");
            for diagnostic in e.diagnostics() {
                print!("{}", diagnostic.render(source));
            }
        }
    }
    println!();
}

fn main() {
    // Unterminated string literal
    show("unterminated.dkl", "@SET tag = \"latest\nFROM alpine\n");

    // Three malformed statements, each reported once
    show("syntax.dkl", "@SET = 1\n@SET x = (2\n@SET y = * 3\nRUN ok\n");

    // Division by zero stops execution
    show("runtime.dkl", "@SET n = 0\nFROM alpine\n@SET ratio = 10 / n\n");
}
