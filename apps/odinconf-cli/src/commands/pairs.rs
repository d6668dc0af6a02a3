use crate::error::{CliError, CliResult};
use crate::input::{check_scheme_inputs, InputArgs};
use odinconf_config::{pair_records, pairs_to_json, write_pairs_csv};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

pub fn execute(input: InputArgs, format: String, output: Option<PathBuf>) -> CliResult<()> {
    check_scheme_inputs(&input)?;

    let config = input.build_config(0, 0, false)?;
    let records = pair_records(&config);

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    match format.as_str() {
        "csv" => write_pairs_csv(&mut writer, &records)?,
        "json" => {
            let doc = pairs_to_json(&config.subject_id, &records);
            serde_json::to_writer_pretty(&mut writer, &doc)?;
            writeln!(writer)?;
        }
        other => {
            return Err(CliError::InvalidInput(format!(
                "unknown pairs format {other:?} (expected csv or json)"
            )))
        }
    }

    if let Some(path) = output {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
