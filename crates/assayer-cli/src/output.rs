use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(report: &Value, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(report)?,
    }

    Ok(())
}

fn render_table(report: &Value) -> Result<(), CliError> {
    let Value::Object(fields) = report else {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    };

    let width = fields.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in fields {
        match value {
            Value::Null => println!("{key:width$} : -"),
            Value::String(text) => println!("{key:width$} : {text}"),
            Value::Bool(_) | Value::Number(_) => println!("{key:width$} : {value}"),
            nested => {
                println!("{key:width$} :");
                let pretty = serde_json::to_string_pretty(nested)?;
                for line in pretty.lines() {
                    println!("  {line}");
                }
            }
        }
    }

    Ok(())
}
