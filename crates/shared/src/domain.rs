use std::fmt;

use serde::{Deserialize, Serialize};

/// Device categories the backend's registry reports. The registry is an open
/// set: class names we do not recognize are preserved verbatim so labels can
/// still render them, and the panel lays them out as "nothing selected".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceClass {
    GlassPrinter,
    CassetPrinter,
    CassetPrinterHopper,
    StickerPrinter,
    ScannerDocs,
    Other(String),
}

impl DeviceClass {
    /// Wire name as the backend spells it.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceClass::GlassPrinter => "GlassPrinter",
            DeviceClass::CassetPrinter => "CassetPrinter",
            DeviceClass::CassetPrinterHopper => "CassetPrinterHopper",
            DeviceClass::StickerPrinter => "StickerPrinter",
            DeviceClass::ScannerDocs => "scanner_docs",
            DeviceClass::Other(name) => name,
        }
    }
}

impl From<String> for DeviceClass {
    fn from(value: String) -> Self {
        match value.as_str() {
            "GlassPrinter" => DeviceClass::GlassPrinter,
            "CassetPrinter" => DeviceClass::CassetPrinter,
            "CassetPrinterHopper" => DeviceClass::CassetPrinterHopper,
            "StickerPrinter" => DeviceClass::StickerPrinter,
            "scanner_docs" => DeviceClass::ScannerDocs,
            _ => DeviceClass::Other(value),
        }
    }
}

impl From<DeviceClass> for String {
    fn from(value: DeviceClass) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named field groups of the device panel. Which subset is visible is a pure
/// function of the selected device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    LabelText,
    TemplateNumber,
    HopperNumber,
    ClinicCaseNumber,
    GlassCassetteNumber,
    StainingType,
    ScannerPreview,
    SendLabelButton,
    StickerPrint,
    GlassNumberForm,
}

/// One entry of the device registry, keyed by its network address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterDescriptor {
    pub ip_address: String,
    pub device_class: DeviceClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
