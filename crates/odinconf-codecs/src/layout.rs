//! Field conventions shared by the tabular and binary encodings.

/// Human-friendly ENS bank label for a jackbox slot: slots are wired in four
/// banks of 64, so 1 -> `A-CH01`, 65 -> `B-CH01`, 256 -> `D-CH64`.
pub fn bank_label(index: u16) -> String {
    const BANKS: [char; 4] = ['A', 'B', 'C', 'D'];
    let bank = BANKS[usize::from((index - 1) / 64)];
    let number = match index % 64 {
        0 => 64,
        n => n,
    };
    format!("{bank}-CH{number:02}")
}

/// The comment column attached to each contact row.
pub(crate) fn contact_description(index: u16) -> String {
    format!("#Electrode {} jack box {}#", bank_label(index), index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_labels_cover_all_four_banks() {
        assert_eq!(bank_label(1), "A-CH01");
        assert_eq!(bank_label(64), "A-CH64");
        assert_eq!(bank_label(65), "B-CH01");
        assert_eq!(bank_label(128), "B-CH64");
        assert_eq!(bank_label(129), "C-CH01");
        assert_eq!(bank_label(256), "D-CH64");
    }
}
