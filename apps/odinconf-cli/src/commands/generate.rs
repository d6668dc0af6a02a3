use crate::error::CliResult;
use crate::input::{check_scheme_inputs, InputArgs};
use odinconf_codecs::{to_binary, to_tabular};
use std::fs;
use std::path::PathBuf;

pub fn execute(
    input: InputArgs,
    localization: u32,
    montage: u32,
    stim: bool,
    output_path: Option<PathBuf>,
) -> CliResult<()> {
    check_scheme_inputs(&input)?;

    let config = input.build_config(localization, montage, stim)?;
    let tabular = to_tabular(&config)?;

    match output_path {
        Some(dir) => {
            // The device expects both artifacts side by side under the
            // configuration name.
            let binary = to_binary(&config)?;
            fs::create_dir_all(&dir)?;

            let csv_file = dir.join(format!("{}.csv", config.config_name));
            let bin_file = dir.join(format!("{}.bin", config.config_name));
            fs::write(&csv_file, tabular)?;
            fs::write(&bin_file, binary)?;

            println!("Wrote {}", csv_file.display());
            println!("Wrote {}", bin_file.display());
        }
        None => print!("{tabular}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(dir: &std::path::Path) -> InputArgs {
        let jacksheet = dir.join("jacksheet.txt");
        fs::write(&jacksheet, "1 LA1\n2 LA2\n3 LA9\n4 ECG1\n").unwrap();
        InputArgs {
            subject: "R1308T".into(),
            jacksheet: Some(jacksheet),
            good_leads: None,
            scheme: "bipolar".into(),
            surface_area: 0.001,
            area_file: None,
            mux_channels: None,
            standardize_labels: false,
            reference: None,
            root: dir.to_path_buf(),
        }
    }

    #[test]
    fn writes_both_artifacts_under_the_config_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let input = args(dir.path());

        execute(input, 0, 0, false, Some(out.clone())).unwrap();

        let written: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(written.len(), 2);
        assert!(written.iter().any(|f| f.ends_with(".csv")));
        assert!(written.iter().any(|f| f.ends_with(".bin")));

        let csv_name = written.iter().find(|f| f.ends_with(".csv")).unwrap();
        let text = fs::read_to_string(out.join(csv_name)).unwrap();
        assert!(text.contains("SubjectID:,R1308T"));
        assert!(text.ends_with("EOF\n"));
    }
}
