//! Input resolution shared by the configuration-building commands: data-tree
//! discovery paths, file loading, and aggregate assembly.

use crate::error::{CliError, CliResult};
use odinconf_config::{
    apply_area_table, make_config_name_today, parse_area_table, BuildOptions, ElectrodeConfig,
    PairingOptions, Scheme,
};
use odinconf_jacksheet::{parse_good_leads, parse_jacksheet, JacksheetOptions};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Jacksheet location under the shared data tree.
pub fn jacksheet_path(root: &Path, subject: &str) -> PathBuf {
    root.join("data")
        .join("eeg")
        .join(subject)
        .join("docs")
        .join("jacksheet.txt")
}

/// Good-leads location under the shared data tree.
pub fn good_leads_path(root: &Path, subject: &str) -> PathBuf {
    root.join("data")
        .join("eeg")
        .join(subject)
        .join("tal")
        .join("good_leads.txt")
}

/// Inputs common to every command that builds a configuration.
#[derive(Debug, clap::Args)]
pub struct InputArgs {
    /// Subject ID
    #[arg(short, long)]
    pub subject: String,

    /// Path to the jacksheet file (discovered under --root when omitted)
    #[arg(short, long)]
    pub jacksheet: Option<PathBuf>,

    /// Path to good_leads.txt (discovered under --root when omitted)
    #[arg(short, long)]
    pub good_leads: Option<PathBuf>,

    /// Referencing scheme (bipolar or monopolar)
    #[arg(long, default_value = "bipolar")]
    pub scheme: String,

    /// Default contact surface area in mm^2
    #[arg(short = 'a', long, default_value_t = 0.001)]
    pub surface_area: f64,

    /// Surface-area table file (label-or-electrode to area rows)
    #[arg(long)]
    pub area_file: Option<PathBuf>,

    /// MUX bank size (32 on the Odin ENS); enables bank-boundary and
    /// wrap-around pairing
    #[arg(long)]
    pub mux_channels: Option<u16>,

    /// Standardize contact labels before parsing
    #[arg(long)]
    pub standardize_labels: bool,

    /// Common reference contact label (monopolar only)
    #[arg(long)]
    pub reference: Option<String>,

    /// Data-tree root for jacksheet and good-leads discovery
    #[arg(short, long, default_value = "/")]
    pub root: PathBuf,
}

impl InputArgs {
    pub fn scheme(&self) -> CliResult<Scheme> {
        Ok(self.scheme.parse()?)
    }

    /// Load all inputs and build the configuration aggregate.
    pub fn build_config(&self, localization: u32, montage: u32, stim: bool) -> CliResult<ElectrodeConfig> {
        let scheme = self.scheme()?;

        let jacksheet_file = self
            .jacksheet
            .clone()
            .unwrap_or_else(|| jacksheet_path(&self.root, &self.subject));
        info!(path = %jacksheet_file.display(), "reading jacksheet");
        let raw = fs::read_to_string(&jacksheet_file)?;

        let parse_opts = JacksheetOptions {
            standardize_labels: self.standardize_labels,
            default_surface_area: self.surface_area,
            ..Default::default()
        };
        let contacts = parse_jacksheet(&raw, &parse_opts)?;

        let build = BuildOptions {
            subject: self.subject.clone(),
            localization,
            montage,
            config_name: make_config_name_today(&self.subject, localization, montage, stim),
            good_leads: self.load_good_leads()?,
            pairing: PairingOptions {
                mux_channels: self.mux_channels,
                ..Default::default()
            },
            monopolar_reference: self.reference.clone(),
        };
        let mut config = ElectrodeConfig::from_jacksheet(contacts, scheme, &build)?;

        if let Some(area_file) = &self.area_file {
            let table = parse_area_table(&fs::read_to_string(area_file)?)?;
            apply_area_table(&mut config, &table);
        }

        Ok(config)
    }

    /// An explicitly-passed good-leads file must exist; a discovered one is
    /// optional and falls back to treating every contact as good.
    fn load_good_leads(&self) -> CliResult<Option<HashSet<String>>> {
        if let Some(path) = &self.good_leads {
            return Ok(Some(parse_good_leads(&fs::read_to_string(path)?)));
        }

        let discovered = good_leads_path(&self.root, &self.subject);
        if discovered.exists() {
            Ok(Some(parse_good_leads(&fs::read_to_string(&discovered)?)))
        } else {
            warn!(
                path = %discovered.display(),
                "no good_leads.txt found, assuming all contacts are good"
            );
            Ok(None)
        }
    }
}

/// Reject schemes that need extra inputs the caller did not supply before
/// any file IO happens.
pub fn check_scheme_inputs(args: &InputArgs) -> CliResult<()> {
    if args.scheme()? == Scheme::Monopolar && args.reference.is_none() {
        return Err(CliError::InvalidInput(
            "monopolar scheme requires --reference".to_string(),
        ));
    }
    Ok(())
}
