/*!
# Tabular configuration codec

The tabular form is the human-editable representation of an
[`ElectrodeConfig`]: a metadata header, a contact section, a sense-channel
section, a stimulation section, the common-reference row, and an `EOF`
marker with a trailing newline.

Row order is exactly the in-memory order and is never re-sorted; the device
treats configuration ordering as significant. [`from_tabular`] reconstructs
an aggregate such that re-encoding it reproduces the input byte for byte.
*/

use crate::errors::{CodecError, CodecResult};
use crate::layout::contact_description;
use crate::validate::validate_config;
use odinconf_config::{
    ElectrodeConfig, Scheme, SenseChannel, StimChannel, StimParams,
};
use odinconf_jacksheet::{Contact, MAX_JACKBOX};
use std::collections::HashMap;
use tracing::debug;

const VERSION_KEY: &str = "ODINConfigurationVersion:";
const NAME_KEY: &str = "ConfigurationName:";
const SUBJECT_KEY: &str = "SubjectID:";
const LOCALIZATION_KEY: &str = "Localization:";
const MONTAGE_KEY: &str = "Montage:";
const SCHEME_KEY: &str = "ReferencingScheme:";
const CONTACTS_MARKER: &str = "Contacts:";
const SENSE_SUBCLASSES_MARKER: &str = "SenseChannelSubclasses:";
const SENSE_MARKER: &str = "SenseChannels:";
const STIM_SUBCLASSES_MARKER: &str = "StimulationChannelSubclasses:";
const STIM_MARKER: &str = "StimulationChannels:";
const REF_KEY: &str = "REF:";
const EOF_MARKER: &str = "EOF";

/// Render a configuration in tabular form. Rejects configurations that
/// violate the channel invariants instead of emitting malformed output.
pub fn to_tabular(config: &ElectrodeConfig) -> CodecResult<String> {
    validate_config(config)?;

    let mut lines: Vec<String> = Vec::with_capacity(
        12 + config.num_contacts() + config.num_sense_channels() + 3 * config.num_stim_channels(),
    );

    lines.push(format!("{VERSION_KEY},#{}#", config.version));
    lines.push(format!("{NAME_KEY},{}", config.config_name));
    lines.push(format!("{SUBJECT_KEY},{}", config.subject_id));
    lines.push(format!("{LOCALIZATION_KEY},{}", config.localization));
    lines.push(format!("{MONTAGE_KEY},{}", config.montage));
    lines.push(format!("{SCHEME_KEY},{}", config.scheme));

    lines.push(CONTACTS_MARKER.to_string());
    for contact in config.contacts() {
        lines.push(format!(
            "{},{},{},{:.3},{}",
            contact.label(),
            contact.index(),
            contact.index(),
            contact.surface_area,
            contact_description(contact.index()),
        ));
    }

    lines.push(SENSE_SUBCLASSES_MARKER.to_string());
    lines.push(SENSE_MARKER.to_string());
    for channel in config.sense_channels() {
        let primary = resolve(config, channel.id, channel.primary)?;
        let reference = resolve(config, channel.id, channel.reference)?;
        let area = config
            .channel_surface_area(channel)
            .ok_or(CodecError::UnknownReference {
                channel: channel.id,
                index: channel.primary,
            })?;
        lines.push(format!(
            "{},{},{},{:.3},{},#{}#",
            channel.id,
            primary.label(),
            reference.label(),
            area,
            if channel.stim_enabled { "s" } else { "x" },
            channel.label,
        ));
    }

    lines.push(STIM_SUBCLASSES_MARKER.to_string());
    lines.push(STIM_MARKER.to_string());
    for stim in config.stim_channels() {
        lines.push(format!(
            "StimChannel:,{},{:.3},{},{}",
            stim.name, stim.params.amplitude_ma, stim.params.pulse_width_us, stim.params.frequency_hz,
        ));
        lines.push(format!("Anodes:,{},#", stim.anode));
        lines.push(format!("Cathodes:,{},#", stim.cathode));
    }

    lines.push(format!("{REF_KEY},{},Common", common_reference(config)));
    lines.push(EOF_MARKER.to_string());

    debug!(rows = lines.len(), "rendered tabular configuration");
    Ok(lines.join("\n") + "\n")
}

/// The common-reference jackbox index: 0 for bipolar, the shared reference
/// contact for monopolar.
pub(crate) fn common_reference(config: &ElectrodeConfig) -> u16 {
    match config.scheme {
        Scheme::Bipolar => 0,
        Scheme::Monopolar => config
            .sense_channels()
            .first()
            .map(|c| c.reference)
            .unwrap_or(0),
    }
}

fn resolve(config: &ElectrodeConfig, channel: u32, index: u16) -> CodecResult<&Contact> {
    config
        .contact_by_index(index)
        .ok_or(CodecError::UnknownReference { channel, index })
}

/// Parse a tabular configuration back into an aggregate.
pub fn from_tabular(text: &str) -> CodecResult<ElectrodeConfig> {
    let lines: Vec<&str> = text.lines().collect();
    let mut pos = 0usize;

    let version = header_value(take(&lines, &mut pos, VERSION_KEY)?, VERSION_KEY)
        .and_then(|(lineno, v)| {
            v.strip_prefix('#')
                .and_then(|v| v.strip_suffix('#'))
                .map(str::to_string)
                .ok_or_else(|| CodecError::TabularFormat {
                    line: lineno,
                    reason: "version must be wrapped in `#`".to_string(),
                })
        })?;
    let (_, name) = header_value(take(&lines, &mut pos, NAME_KEY)?, NAME_KEY)?;
    let name = name.to_string();
    let (_, subject) = header_value(take(&lines, &mut pos, SUBJECT_KEY)?, SUBJECT_KEY)?;
    let subject = subject.to_string();
    let localization = parse_header_number(&lines, &mut pos, LOCALIZATION_KEY)?;
    let montage = parse_header_number(&lines, &mut pos, MONTAGE_KEY)?;
    let scheme = {
        let (lineno, value) = header_value(take(&lines, &mut pos, SCHEME_KEY)?, SCHEME_KEY)?;
        value
            .parse::<Scheme>()
            .map_err(|_| CodecError::TabularFormat {
                line: lineno,
                reason: format!("unrecognized referencing scheme {value:?}"),
            })?
    };

    expect_marker(take(&lines, &mut pos, CONTACTS_MARKER)?, CONTACTS_MARKER)?;
    let contacts = parse_contacts(&lines, &mut pos)?;
    let by_label: HashMap<&str, u16> = contacts
        .iter()
        .map(|c| (c.label(), c.index()))
        .collect();

    expect_marker(take(&lines, &mut pos, SENSE_MARKER)?, SENSE_MARKER)?;
    let sense_channels = parse_sense_channels(&lines, &mut pos, scheme, &by_label)?;

    expect_marker(take(&lines, &mut pos, STIM_MARKER)?, STIM_MARKER)?;
    let stim_channels = parse_stim_channels(&lines, &mut pos)?;

    parse_ref_row(take(&lines, &mut pos, REF_KEY)?)?;

    let (lineno, line) = take(&lines, &mut pos, EOF_MARKER)?;
    if line != EOF_MARKER {
        return Err(CodecError::TabularFormat {
            line: lineno,
            reason: format!("expected `{EOF_MARKER}`, found {line:?}"),
        });
    }
    if let Some(extra) = lines[pos..].iter().position(|l| !l.trim().is_empty()) {
        return Err(CodecError::TabularFormat {
            line: pos + extra + 1,
            reason: "content after EOF marker".to_string(),
        });
    }

    let config = ElectrodeConfig::from_parts(
        version,
        subject,
        localization,
        montage,
        name,
        scheme,
        contacts,
        sense_channels,
        stim_channels,
    );
    validate_config(&config)?;
    debug!(
        name = config.config_name,
        contacts = config.num_contacts(),
        sense = config.num_sense_channels(),
        stim = config.num_stim_channels(),
        "parsed tabular configuration"
    );
    Ok(config)
}

// ================================================================================================
// Section parsers
// ================================================================================================

fn parse_contacts(lines: &[&str], pos: &mut usize) -> CodecResult<Vec<Contact>> {
    let mut contacts = Vec::new();
    let mut seen = HashMap::new();

    loop {
        let (lineno, line) = take(lines, pos, SENSE_SUBCLASSES_MARKER)?;
        if line == SENSE_SUBCLASSES_MARKER {
            return Ok(contacts);
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 {
            return Err(CodecError::TabularFormat {
                line: lineno,
                reason: format!("contact row must have 5 fields, found {}", fields.len()),
            });
        }

        let index = parse_number::<u16>(lineno, fields[1], "contact index")?;
        if index == 0 || index > MAX_JACKBOX {
            return Err(CodecError::TabularFormat {
                line: lineno,
                reason: format!(
                    "contact index {index} is outside the hardware range 1..={MAX_JACKBOX}"
                ),
            });
        }
        let area = parse_number::<f64>(lineno, fields[3], "surface area")?;
        if let Some(previous) = seen.insert(index, lineno) {
            return Err(CodecError::TabularFormat {
                line: lineno,
                reason: format!("contact index {index} already defined at line {previous}"),
            });
        }

        contacts.push(Contact::new(index, fields[0], area)?);
    }
}

fn parse_sense_channels(
    lines: &[&str],
    pos: &mut usize,
    scheme: Scheme,
    by_label: &HashMap<&str, u16>,
) -> CodecResult<Vec<SenseChannel>> {
    let mut channels = Vec::new();

    loop {
        let (lineno, line) = take(lines, pos, STIM_SUBCLASSES_MARKER)?;
        if line == STIM_SUBCLASSES_MARKER {
            return Ok(channels);
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 6 {
            return Err(CodecError::TabularFormat {
                line: lineno,
                reason: format!("sense-channel row must have 6 fields, found {}", fields.len()),
            });
        }

        let id = parse_number::<u32>(lineno, fields[0], "channel id")?;
        let primary_label = fields[1];
        let reference_label = fields[2];
        let area = parse_number::<f64>(lineno, fields[3], "surface area")?;
        let stim_enabled = match fields[4] {
            "x" => false,
            "s" => true,
            other => {
                return Err(CodecError::TabularFormat {
                    line: lineno,
                    reason: format!("stim-enabled flag must be `x` or `s`, found {other:?}"),
                })
            }
        };

        let lookup = |label: &str| {
            by_label
                .get(label)
                .copied()
                .ok_or_else(|| CodecError::TabularFormat {
                    line: lineno,
                    reason: format!("sense channel references unknown contact {label:?}"),
                })
        };
        let primary = lookup(primary_label)?;
        let reference = lookup(reference_label)?;

        let label = match scheme {
            Scheme::Bipolar => format!("{primary_label}-{reference_label}"),
            Scheme::Monopolar => primary_label.to_string(),
        };

        channels.push(SenseChannel {
            id,
            primary,
            reference,
            label,
            surface_area: Some(area),
            stim_enabled,
        });
    }
}

fn parse_stim_channels(lines: &[&str], pos: &mut usize) -> CodecResult<Vec<StimChannel>> {
    let mut stim_channels = Vec::new();

    while !peek(lines, *pos).is_some_and(|l| l.starts_with(REF_KEY)) {
        let (lineno, line) = take(lines, pos, "StimChannel: row")?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 || fields[0] != "StimChannel:" {
            return Err(CodecError::TabularFormat {
                line: lineno,
                reason: "expected `StimChannel:,<name>,<amplitude>,<pulse width>,<frequency>`"
                    .to_string(),
            });
        }
        let name = fields[1].to_string();
        let params = StimParams {
            amplitude_ma: parse_number(lineno, fields[2], "amplitude")?,
            pulse_width_us: parse_number(lineno, fields[3], "pulse width")?,
            frequency_hz: parse_number(lineno, fields[4], "frequency")?,
        };

        let anode = parse_electrode_row(take(lines, pos, "Anodes: row")?, "Anodes:")?;
        let cathode = parse_electrode_row(take(lines, pos, "Cathodes: row")?, "Cathodes:")?;

        stim_channels.push(StimChannel {
            name,
            anode,
            cathode,
            params,
        });
    }

    Ok(stim_channels)
}

fn parse_electrode_row((lineno, line): (usize, &str), key: &str) -> CodecResult<u16> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 3 || fields[0] != key {
        return Err(CodecError::TabularFormat {
            line: lineno,
            reason: format!("expected `{key},<contact index>,#`"),
        });
    }
    parse_number(lineno, fields[1], "contact index")
}

fn parse_ref_row((lineno, line): (usize, &str)) -> CodecResult<u16> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 3 || fields[0] != REF_KEY {
        return Err(CodecError::TabularFormat {
            line: lineno,
            reason: format!("expected `{REF_KEY},<contact index>,Common`"),
        });
    }
    parse_number(lineno, fields[1], "reference index")
}

// ================================================================================================
// Low-level helpers
// ================================================================================================

fn take<'a>(lines: &[&'a str], pos: &mut usize, expecting: &str) -> CodecResult<(usize, &'a str)> {
    match lines.get(*pos) {
        Some(line) => {
            *pos += 1;
            Ok((*pos, line))
        }
        None => Err(CodecError::TabularFormat {
            line: *pos + 1,
            reason: format!("unexpected end of file, expected {expecting}"),
        }),
    }
}

fn peek<'a>(lines: &[&'a str], pos: usize) -> Option<&'a str> {
    lines.get(pos).copied()
}

fn header_value<'a>(
    (lineno, line): (usize, &'a str),
    key: &str,
) -> CodecResult<(usize, &'a str)> {
    match line.split_once(',') {
        Some((k, v)) if k == key => Ok((lineno, v)),
        _ => Err(CodecError::TabularFormat {
            line: lineno,
            reason: format!("expected `{key},<value>`"),
        }),
    }
}

fn parse_header_number(lines: &[&str], pos: &mut usize, key: &str) -> CodecResult<u32> {
    let (lineno, value) = header_value(take(lines, pos, key)?, key)?;
    parse_number(lineno, value, key.trim_end_matches(':'))
}

fn expect_marker((lineno, line): (usize, &str), marker: &str) -> CodecResult<()> {
    if line == marker {
        Ok(())
    } else {
        Err(CodecError::TabularFormat {
            line: lineno,
            reason: format!("expected `{marker}`, found {line:?}"),
        })
    }
}

fn parse_number<T: std::str::FromStr>(lineno: usize, value: &str, what: &str) -> CodecResult<T> {
    value.parse().map_err(|_| CodecError::TabularFormat {
        line: lineno,
        reason: format!("malformed {what}: {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use odinconf_config::{BuildOptions, StimParams};
    use odinconf_jacksheet::{parse_jacksheet, JacksheetOptions};

    fn bipolar(raw: &str) -> ElectrodeConfig {
        let contacts = parse_jacksheet(raw, &JacksheetOptions::default()).unwrap();
        let opts = BuildOptions {
            subject: "R1308T".into(),
            config_name: "R1308T_14JUN2017L0M0NOSTIM".into(),
            ..Default::default()
        };
        ElectrodeConfig::from_jacksheet(contacts, Scheme::Bipolar, &opts).unwrap()
    }

    #[test]
    fn renders_the_documented_layout() {
        let config = bipolar("1 LA1\n2 LA2\n3 LA9\n4 ECG1\n");
        let expected = "\
ODINConfigurationVersion:,#1.2#
ConfigurationName:,R1308T_14JUN2017L0M0NOSTIM
SubjectID:,R1308T
Localization:,0
Montage:,0
ReferencingScheme:,bipolar
Contacts:
LA1,1,1,0.001,#Electrode A-CH01 jack box 1#
LA2,2,2,0.001,#Electrode A-CH02 jack box 2#
LA9,3,3,0.001,#Electrode A-CH03 jack box 3#
SenseChannelSubclasses:
SenseChannels:
1,LA1,LA2,0.001,x,#LA1-LA2#
2,LA2,LA9,0.001,x,#LA2-LA9#
StimulationChannelSubclasses:
StimulationChannels:
REF:,0,Common
EOF
";
        assert_eq!(to_tabular(&config).unwrap(), expected);
    }

    #[test]
    fn round_trip_is_idempotent() {
        let mut config = bipolar("1 LA1\n2 LA2\n3 LA3\n4 LB1\n5 LB2\n");
        config
            .add_stim_channel(
                "LA1",
                "LA2",
                StimParams {
                    amplitude_ma: 0.5,
                    pulse_width_us: 300,
                    frequency_hz: 200,
                },
            )
            .unwrap();
        config.set_surface_area("LB", 1.5).unwrap();

        let first = to_tabular(&config).unwrap();
        let reloaded = from_tabular(&first).unwrap();
        assert_eq!(to_tabular(&reloaded).unwrap(), first);
    }

    #[test]
    fn round_trip_preserves_metadata() {
        let text = to_tabular(&bipolar("1 LA1\n2 LA2\n")).unwrap();
        let config = from_tabular(&text).unwrap();
        assert_eq!(config.version, "1.2");
        assert_eq!(config.subject_id, "R1308T");
        assert_eq!(config.config_name, "R1308T_14JUN2017L0M0NOSTIM");
        assert_eq!(config.scheme, Scheme::Bipolar);
        assert_eq!(config.num_contacts(), 2);
        assert_eq!(config.num_sense_channels(), 1);
    }

    #[test]
    fn row_order_follows_memory_order_not_sort_order() {
        // LB before LA in the jacksheet stays LB before LA in the output.
        let text = to_tabular(&bipolar("1 LB1\n2 LB2\n3 LA1\n4 LA2\n")).unwrap();
        let lb = text.find("LB1,1").unwrap();
        let la = text.find("LA1,3").unwrap();
        assert!(lb < la);
    }

    #[test]
    fn monopolar_round_trip_keeps_reference_row() {
        let contacts =
            parse_jacksheet("1 LA1\n2 LA2\n3 LAref\n", &JacksheetOptions::default()).unwrap();
        let opts = BuildOptions {
            subject: "R1308T".into(),
            config_name: "R1308T_14JUN2017L0M0NOSTIM".into(),
            monopolar_reference: Some("LAref".into()),
            ..Default::default()
        };
        let config = ElectrodeConfig::from_jacksheet(contacts, Scheme::Monopolar, &opts).unwrap();

        let text = to_tabular(&config).unwrap();
        assert!(text.contains("REF:,3,Common\n"));
        assert!(text.contains("1,LA1,LAref,0.001,x,#LA1#\n"));

        let reloaded = from_tabular(&text).unwrap();
        assert_eq!(to_tabular(&reloaded).unwrap(), text);
    }

    #[test]
    fn missing_columns_are_format_errors() {
        let text = to_tabular(&bipolar("1 LA1\n2 LA2\n")).unwrap();
        let broken = text.replace("1,LA1,LA2,0.001,x,#LA1-LA2#", "1,LA1,LA2,0.001,x");
        assert!(matches!(
            from_tabular(&broken).unwrap_err(),
            CodecError::TabularFormat { .. }
        ));
    }

    #[test]
    fn malformed_numerics_are_format_errors() {
        let text = to_tabular(&bipolar("1 LA1\n2 LA2\n")).unwrap();
        let broken = text.replace("1,LA1,LA2,0.001", "one,LA1,LA2,0.001");
        let err = from_tabular(&broken).unwrap_err();
        match err {
            CodecError::TabularFormat { reason, .. } => {
                assert!(reason.contains("channel id"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_contact_index_is_a_format_error() {
        // Hand-edited files can carry indexes no jackbox has; both the
        // zero and the beyond-bank-D cases must fail the parse instead of
        // surviving to blow up bank-label arithmetic on re-encode.
        let text = to_tabular(&bipolar("1 LA1\n2 LA2\n")).unwrap();
        for broken in [
            text.replace("LA1,1,1", "LA1,300,300"),
            text.replace("LA1,1,1", "LA1,0,0"),
        ] {
            let err = from_tabular(&broken).unwrap_err();
            match err {
                CodecError::TabularFormat { reason, .. } => {
                    assert!(reason.contains("hardware range"), "{reason}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn unknown_sense_contact_is_a_format_error() {
        let text = to_tabular(&bipolar("1 LA1\n2 LA2\n")).unwrap();
        let broken = text.replace("1,LA1,LA2", "1,LA7,LA2");
        assert!(matches!(
            from_tabular(&broken).unwrap_err(),
            CodecError::TabularFormat { .. }
        ));
    }

    #[test]
    fn content_after_eof_is_rejected() {
        let text = to_tabular(&bipolar("1 LA1\n2 LA2\n")).unwrap();
        let broken = format!("{text}stray\n");
        assert!(matches!(
            from_tabular(&broken).unwrap_err(),
            CodecError::TabularFormat { .. }
        ));
    }

    #[test]
    fn stim_rows_round_trip() {
        let mut config = bipolar("1 LA1\n2 LA2\n3 LA3\n");
        config
            .add_stim_channel(
                "LA2",
                "LA3",
                StimParams {
                    amplitude_ma: 1.0,
                    pulse_width_us: 300,
                    frequency_hz: 50,
                },
            )
            .unwrap();

        let text = to_tabular(&config).unwrap();
        assert!(text.contains("StimChannel:,LA2-LA3,1.000,300,50\n"));
        assert!(text.contains("Anodes:,2,#\n"));
        assert!(text.contains("Cathodes:,3,#\n"));

        let reloaded = from_tabular(&text).unwrap();
        assert_eq!(reloaded.num_stim_channels(), 1);
        assert_eq!(reloaded.stim_channels()[0].anode, 2);
        assert_eq!(reloaded.stim_channels()[0].params.frequency_hz, 50);
    }

    #[test]
    fn invariant_violations_are_rejected_before_encoding() {
        let contacts = parse_jacksheet("1 LA1\n2 LA2\n3 LA3\n", &JacksheetOptions::default()).unwrap();
        let duplicate = SenseChannel {
            id: 2,
            primary: 1,
            reference: 3,
            label: "LA1-LA3".into(),
            surface_area: None,
            stim_enabled: false,
        };
        let mut first = duplicate.clone();
        first.id = 1;
        first.reference = 2;
        first.label = "LA1-LA2".into();

        let config = ElectrodeConfig::from_parts(
            "1.2".into(),
            "R1".into(),
            0,
            0,
            "TEST".into(),
            Scheme::Bipolar,
            contacts,
            vec![first, duplicate],
            Vec::new(),
        );
        assert!(matches!(
            to_tabular(&config).unwrap_err(),
            CodecError::DuplicatePrimary { .. }
        ));
    }
}
