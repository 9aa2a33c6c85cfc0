//! Display variable address map and touch classifier
//!
//! Every touch control on the panel is bound to one variable address. The
//! mainboard only reacts to the addresses listed in [`ADDRESS_TABLE`]; the
//! filename block is recognised by range because its size depends on the
//! configured file count.

// Print control and status
pub const START_ICON_ADDR: u16 = 0x1000;
pub const PRINT_FILE_ADDR: u16 = 0x1002;
pub const ADJUST_ADDR: u16 = 0x1004;
pub const FEEDRATE_ADDR: u16 = 0x1006;
pub const STOP_PRINT_ADDR: u16 = 0x1008;
pub const PAUSE_PRINT_ADDR: u16 = 0x100A;
pub const RESUME_PRINT_ADDR: u16 = 0x100C;
pub const PRINT_SCHEDULE_ICON_ADDR: u16 = 0x100E;
pub const TIME_HOUR_ADDR: u16 = 0x1010;
pub const TIME_MIN_ADDR: u16 = 0x1012;
pub const ICON_PRINT_STATUS_ADDR: u16 = 0x1014;
pub const PERCENTAGE_ADDR: u16 = 0x1016;
pub const FAN_KEY_ICON_ADDR: u16 = 0x101E;

// Temperature and Z-offset
pub const HEAT_HINT_ADDR: u16 = 0x1020;
pub const HEAT_PERCENT_ICON_ADDR: u16 = 0x1024;
pub const Z_OFFSET_ADDR: u16 = 0x1026;
pub const TEMP_CONTROL_ADDR: u16 = 0x1030;
pub const NZ_BD_SET_ADDR: u16 = 0x1032;
pub const NOZZLE_PREHEAT_ADDR: u16 = 0x1034;
pub const NOZZLE_TEMP_ADDR: u16 = 0x1036;
pub const BED_PREHEAT_ADDR: u16 = 0x103A;
pub const BED_TEMP_ADDR: u16 = 0x103C;

// Settings, leveling, axes
pub const SETTING_ADDR: u16 = 0x103E;
pub const RETURN_BACK_ADDR: u16 = 0x1040;
pub const AUTO_ZERO_ICON_ADDR: u16 = 0x1042;
pub const BED_LEVEL_ADDR: u16 = 0x1044;
pub const AUTO_LEVEL_ICON_ADDR: u16 = 0x1045;
pub const AUTO_ZERO_ADDR: u16 = 0x1046;
pub const DISPLAY_X_ADDR: u16 = 0x1048;
pub const DISPLAY_Y_ADDR: u16 = 0x104A;
pub const DISPLAY_Z_ADDR: u16 = 0x104C;

// Filament, language, power loss
pub const FILAMENT_UNIT1_ADDR: u16 = 0x1054;
pub const EXCH_FILAMENT_ADDR: u16 = 0x1056;
pub const FILAMENT_UNIT2_ADDR: u16 = 0x1058;
pub const LANGUAGE_ADDR: u16 = 0x105C;
pub const NO_FILAMENT_ADDR: u16 = 0x105E;
pub const POWER_LOSS_ADDR: u16 = 0x105F;

// Machine info strings
pub const MAC_VERSION_ADDR: u16 = 0x1060;
pub const SOFT_VERSION_ADDR: u16 = 0x106A;
pub const PRINTER_SIZE_ADDR: u16 = 0x1074;
pub const CORP_WEBSITE_ADDR: u16 = 0x107E;

// Sound and misc icons
pub const VOLUME_ADDR: u16 = 0x1088;
pub const SOUND_ICON_ADDR: u16 = 0x1089;
pub const VOLUME_ICON_ADDR: u16 = 0x108A;
pub const AUTOLEVEL_GRID_ICON_ADDR: u16 = 0x108D;
pub const EXCH_FLMNT_ICON_ADDR: u16 = 0x108E;
pub const REMAIN_HOUR_ADDR: u16 = 0x10D2;
pub const REMAIN_MIN_ADDR: u16 = 0x10D4;
pub const AUTOLEVEL_VAL_ADDR: u16 = 0x1100;

// File list
pub const FILENAME_ICON_ADDR: u16 = 0x1200;
pub const FILENAME_ICON1_ADDR: u16 = 0x1220;
pub const PRINT_FILENAME_ADDR: u16 = 0x2000;
pub const SDFILE_ADDR: u16 = 0x200A;
pub const FILENAME_PLAY_ADDR: u16 = 0x20D2;
pub const FILENAME_CHS_ADDR: u16 = 0x20D3;
pub const CHOOSE_FILENAME_ADDR: u16 = 0x20D4;
pub const FILENAME_COUNT_ADDR: u16 = 0x20DE;
pub const FILENAME_NATURE_ADDR: u16 = 0x6003;

/// Address stride between consecutive file slots
pub const FILE_SLOT_SIZE: u16 = 10;

// System variables
pub const EXCHANGE_PAGE_ADDR: u16 = 0x0084;
pub const SOUND_ADDR: u16 = 0x00A0;

/// Boot chime command written to `SOUND_ADDR`
pub const START_SOUND: u32 = 0x0604_80A0;

/// Icon index offset of the second (English) icon set
pub const ICON_SET_OFFSET: u8 = 10;

/// Print control buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrintControl {
    Stop,
    Pause,
    Resume,
}

/// Manual temperature fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempField {
    /// Page button shared by both heaters
    Both,
    Nozzle,
    Bed,
}

/// Axis jog and homing controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisKey {
    Home,
    X,
    Y,
    Z,
}

/// Filament page controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilamentKey {
    /// Amount for extruder 0
    Unit1,
    /// Load/unload buttons and heat prompt
    Exchange,
    /// Amount for extruder 1
    Unit2,
}

/// Controls inside the filename block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FileKey {
    /// Entry selected on the list
    Choose,
    /// Start or back
    Play,
    /// Any other address in the block (slot text)
    Other,
}

/// Logical command category of a touch frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    PrintFile,
    Adjust,
    Feedrate,
    PrintChoice(PrintControl),
    ZOffset,
    TempControl,
    ManualTemp(TempField),
    Setting,
    ReturnBack,
    BedLevel,
    Axis(AxisKey),
    Filament(FilamentKey),
    Language,
    NoFilament,
    PowerLoss,
    Volume,
    Filename(FileKey),
}

/// Addresses the mainboard listens to, in dispatch order
pub const ADDRESS_TABLE: [u16; 28] = [
    PRINT_FILE_ADDR,
    ADJUST_ADDR,
    FEEDRATE_ADDR,
    STOP_PRINT_ADDR,
    PAUSE_PRINT_ADDR,
    RESUME_PRINT_ADDR,
    Z_OFFSET_ADDR,
    TEMP_CONTROL_ADDR,
    NZ_BD_SET_ADDR,
    NOZZLE_PREHEAT_ADDR,
    BED_PREHEAT_ADDR,
    SETTING_ADDR,
    RETURN_BACK_ADDR,
    BED_LEVEL_ADDR,
    AUTO_ZERO_ADDR,
    DISPLAY_X_ADDR,
    DISPLAY_Y_ADDR,
    DISPLAY_Z_ADDR,
    FILAMENT_UNIT1_ADDR,
    EXCH_FILAMENT_ADDR,
    FILAMENT_UNIT2_ADDR,
    LANGUAGE_ADDR,
    NO_FILAMENT_ADDR,
    POWER_LOSS_ADDR,
    VOLUME_ADDR,
    FILENAME_CHS_ADDR,
    FILENAME_PLAY_ADDR,
    CHOOSE_FILENAME_ADDR,
];

/// Last address of the filename block for `max_files` slots
pub fn filename_block_end(max_files: u8) -> u16 {
    SDFILE_ADDR + FILE_SLOT_SIZE * (u16::from(max_files) + 1)
}

/// Map a listed address to its category
///
/// Contiguous control groups share one category with a sub-key.
fn category_of(address: u16) -> Option<Category> {
    let category = match address {
        STOP_PRINT_ADDR => Category::PrintChoice(PrintControl::Stop),
        PAUSE_PRINT_ADDR => Category::PrintChoice(PrintControl::Pause),
        RESUME_PRINT_ADDR => Category::PrintChoice(PrintControl::Resume),
        NZ_BD_SET_ADDR => Category::ManualTemp(TempField::Both),
        NOZZLE_PREHEAT_ADDR => Category::ManualTemp(TempField::Nozzle),
        BED_PREHEAT_ADDR => Category::ManualTemp(TempField::Bed),
        AUTO_ZERO_ADDR => Category::Axis(AxisKey::Home),
        DISPLAY_X_ADDR => Category::Axis(AxisKey::X),
        DISPLAY_Y_ADDR => Category::Axis(AxisKey::Y),
        DISPLAY_Z_ADDR => Category::Axis(AxisKey::Z),
        FILAMENT_UNIT1_ADDR => Category::Filament(FilamentKey::Unit1),
        EXCH_FILAMENT_ADDR => Category::Filament(FilamentKey::Exchange),
        FILAMENT_UNIT2_ADDR => Category::Filament(FilamentKey::Unit2),
        PRINT_FILE_ADDR => Category::PrintFile,
        ADJUST_ADDR => Category::Adjust,
        FEEDRATE_ADDR => Category::Feedrate,
        Z_OFFSET_ADDR => Category::ZOffset,
        TEMP_CONTROL_ADDR => Category::TempControl,
        SETTING_ADDR => Category::Setting,
        RETURN_BACK_ADDR => Category::ReturnBack,
        BED_LEVEL_ADDR => Category::BedLevel,
        LANGUAGE_ADDR => Category::Language,
        NO_FILAMENT_ADDR => Category::NoFilament,
        POWER_LOSS_ADDR => Category::PowerLoss,
        VOLUME_ADDR => Category::Volume,
        FILENAME_CHS_ADDR => Category::Filename(FileKey::Choose),
        FILENAME_PLAY_ADDR => Category::Filename(FileKey::Play),
        CHOOSE_FILENAME_ADDR => Category::Filename(FileKey::Other),
        _ => return None,
    };
    Some(category)
}

/// Classify a touch address
///
/// Addresses inside the filename block always classify as `Filename`,
/// whatever the table says. Anything else must be listed in
/// [`ADDRESS_TABLE`]; unlisted addresses return `None`.
pub fn classify(address: u16, max_files: u8) -> Option<Category> {
    if (SDFILE_ADDR..=filename_block_end(max_files)).contains(&address) {
        let key = match address {
            FILENAME_CHS_ADDR => FileKey::Choose,
            FILENAME_PLAY_ADDR => FileKey::Play,
            _ => FileKey::Other,
        };
        return Some(Category::Filename(key));
    }

    ADDRESS_TABLE
        .iter()
        .find(|&&listed| listed == address)
        .and_then(|&listed| category_of(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_entries_classify() {
        let expected = [
            (PRINT_FILE_ADDR, Category::PrintFile),
            (ADJUST_ADDR, Category::Adjust),
            (FEEDRATE_ADDR, Category::Feedrate),
            (STOP_PRINT_ADDR, Category::PrintChoice(PrintControl::Stop)),
            (PAUSE_PRINT_ADDR, Category::PrintChoice(PrintControl::Pause)),
            (RESUME_PRINT_ADDR, Category::PrintChoice(PrintControl::Resume)),
            (Z_OFFSET_ADDR, Category::ZOffset),
            (TEMP_CONTROL_ADDR, Category::TempControl),
            (NZ_BD_SET_ADDR, Category::ManualTemp(TempField::Both)),
            (NOZZLE_PREHEAT_ADDR, Category::ManualTemp(TempField::Nozzle)),
            (BED_PREHEAT_ADDR, Category::ManualTemp(TempField::Bed)),
            (SETTING_ADDR, Category::Setting),
            (RETURN_BACK_ADDR, Category::ReturnBack),
            (BED_LEVEL_ADDR, Category::BedLevel),
            (AUTO_ZERO_ADDR, Category::Axis(AxisKey::Home)),
            (DISPLAY_X_ADDR, Category::Axis(AxisKey::X)),
            (DISPLAY_Y_ADDR, Category::Axis(AxisKey::Y)),
            (DISPLAY_Z_ADDR, Category::Axis(AxisKey::Z)),
            (FILAMENT_UNIT1_ADDR, Category::Filament(FilamentKey::Unit1)),
            (EXCH_FILAMENT_ADDR, Category::Filament(FilamentKey::Exchange)),
            (FILAMENT_UNIT2_ADDR, Category::Filament(FilamentKey::Unit2)),
            (LANGUAGE_ADDR, Category::Language),
            (NO_FILAMENT_ADDR, Category::NoFilament),
            (POWER_LOSS_ADDR, Category::PowerLoss),
            (VOLUME_ADDR, Category::Volume),
            (FILENAME_CHS_ADDR, Category::Filename(FileKey::Choose)),
            (FILENAME_PLAY_ADDR, Category::Filename(FileKey::Play)),
            (CHOOSE_FILENAME_ADDR, Category::Filename(FileKey::Other)),
        ];
        assert_eq!(expected.len(), ADDRESS_TABLE.len());

        // Same answer whether or not the filename block covers the address
        for max_files in [1, 20, 40] {
            for (&address, &(listed, category)) in ADDRESS_TABLE.iter().zip(expected.iter()) {
                assert_eq!(address, listed);
                assert_eq!(
                    classify(address, max_files),
                    Some(category),
                    "0x{:04X} with {} files",
                    address,
                    max_files
                );
            }
        }
    }

    #[test]
    fn test_print_control_range() {
        assert_eq!(
            classify(STOP_PRINT_ADDR, 20),
            Some(Category::PrintChoice(PrintControl::Stop))
        );
        assert_eq!(
            classify(PAUSE_PRINT_ADDR, 20),
            Some(Category::PrintChoice(PrintControl::Pause))
        );
        assert_eq!(
            classify(RESUME_PRINT_ADDR, 20),
            Some(Category::PrintChoice(PrintControl::Resume))
        );
        // Gaps between listed controls are not controls
        assert_eq!(classify(STOP_PRINT_ADDR + 1, 20), None);
    }

    #[test]
    fn test_axis_and_filament_groups() {
        assert_eq!(classify(AUTO_ZERO_ADDR, 20), Some(Category::Axis(AxisKey::Home)));
        assert_eq!(classify(DISPLAY_Z_ADDR, 20), Some(Category::Axis(AxisKey::Z)));
        assert_eq!(
            classify(EXCH_FILAMENT_ADDR, 20),
            Some(Category::Filament(FilamentKey::Exchange))
        );
        assert_eq!(
            classify(BED_PREHEAT_ADDR, 20),
            Some(Category::ManualTemp(TempField::Bed))
        );
    }

    #[test]
    fn test_filename_keys() {
        assert_eq!(
            classify(FILENAME_CHS_ADDR, 20),
            Some(Category::Filename(FileKey::Choose))
        );
        assert_eq!(
            classify(FILENAME_PLAY_ADDR, 20),
            Some(Category::Filename(FileKey::Play))
        );
        assert_eq!(classify(SDFILE_ADDR, 20), Some(Category::Filename(FileKey::Other)));
    }

    #[test]
    fn test_filename_block_bounds() {
        assert_eq!(filename_block_end(20), 0x20DC);
        assert_eq!(classify(0x20DC, 20), Some(Category::Filename(FileKey::Other)));
        assert_eq!(classify(0x20DD, 20), None);
        assert_eq!(classify(SDFILE_ADDR - 1, 20), None);
    }

    #[test]
    fn test_unknown_addresses() {
        assert_eq!(classify(0x0000, 20), None);
        assert_eq!(classify(NOZZLE_TEMP_ADDR, 20), None);
        assert_eq!(classify(0xFFFF, 20), None);
    }

    proptest! {
        #[test]
        fn test_filename_block_always_filename(max_files in 1u8..=40, offset in any::<u16>()) {
            let end = filename_block_end(max_files);
            let address = SDFILE_ADDR + offset % (end - SDFILE_ADDR + 1);
            prop_assert!(matches!(classify(address, max_files), Some(Category::Filename(_))));
        }

        #[test]
        fn test_unlisted_outside_block_is_unknown(address in any::<u16>()) {
            let in_block = (SDFILE_ADDR..=filename_block_end(20)).contains(&address);
            prop_assume!(!in_block && !ADDRESS_TABLE.contains(&address));
            prop_assert_eq!(classify(address, 20), None);
        }
    }
}
