use crate::error::CliResult;
use odinconf_codecs::from_tabular;
use std::fs;
use std::path::PathBuf;

pub fn execute(config_file: PathBuf, channels: bool) -> CliResult<()> {
    let config = from_tabular(&fs::read_to_string(&config_file)?)?;

    println!("Configuration: {}", config.config_name);
    println!("Subject:       {}", config.subject_id);
    println!("Version:       {}", config.version);
    println!("Scheme:        {}", config.scheme);
    println!("Localization:  {}", config.localization);
    println!("Montage:       {}", config.montage);
    println!("Contacts:      {}", config.num_contacts());
    println!("Sense:         {}", config.num_sense_channels());
    println!("Stim:          {}", config.num_stim_channels());

    if channels {
        println!();
        for channel in config.sense_channels() {
            println!(
                "  sense {:>3}  {}  ({} -> {})",
                channel.id, channel.label, channel.primary, channel.reference
            );
        }
        for stim in config.stim_channels() {
            println!(
                "  stim       {}  ({} -> {}, {:.3} mA, {} us, {} Hz)",
                stim.name,
                stim.anode,
                stim.cathode,
                stim.params.amplitude_ma,
                stim.params.pulse_width_us,
                stim.params.frequency_hz
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use odinconf_codecs::to_tabular;
    use odinconf_config::{BuildOptions, ElectrodeConfig, Scheme};
    use odinconf_jacksheet::{parse_jacksheet, JacksheetOptions};

    #[test]
    fn reads_a_written_configuration_back() {
        let contacts =
            parse_jacksheet("1 LA1\n2 LA2\n", &JacksheetOptions::default()).unwrap();
        let opts = BuildOptions {
            subject: "R1308T".into(),
            config_name: "R1308T_14JUN2017L0M0NOSTIM".into(),
            ..Default::default()
        };
        let config = ElectrodeConfig::from_jacksheet(contacts, Scheme::Bipolar, &opts).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.csv");
        fs::write(&path, to_tabular(&config).unwrap()).unwrap();

        execute(path, true).unwrap();
    }
}
