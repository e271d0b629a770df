//! Device print/scan panel: suggestion list, class-driven layout, and the
//! scan/print actions against the backend.

use reqwest::Client;
use shared::{
    domain::{DeviceClass, FieldGroup, PrinterDescriptor},
    protocol::PrintReport,
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    events::{ClientEvent, Notice},
    normalize_base_url,
    session::SessionContext,
    ActionError,
};

pub const DEFAULT_SCANNER_PORT: u16 = 8080;

const MISSING_SELECTION_MESSAGE: &str = "select a scanner from the list";
const PRINT_FAILURE_MESSAGE: &str = "label print request failed";

/// Panel lifecycle. Terminal-ish scan states give way to `Configured` again
/// on the next user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelPhase {
    Idle,
    AwaitingSelection,
    Configured(DeviceClass),
    Scanning,
    ScanSucceeded,
    ScanFailed,
}

/// One selectable entry: the value the input matches on and the label the
/// host renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSuggestion {
    pub value: String,
    pub label: String,
}

/// Most recent scan image. Replacing it drops the superseded buffer, so
/// repeated scans do not accumulate.
#[derive(Debug, Clone)]
pub struct ScanPreview {
    pub bytes: Vec<u8>,
}

/// Per-class visible-field-group table. Unknown or absent classes lay out
/// as nothing selected.
pub fn layout_for(class: Option<&DeviceClass>) -> &'static [FieldGroup] {
    use FieldGroup::*;
    match class {
        Some(DeviceClass::GlassPrinter) => &[
            GlassNumberForm,
            TemplateNumber,
            ClinicCaseNumber,
            GlassCassetteNumber,
            StainingType,
            SendLabelButton,
        ],
        Some(DeviceClass::CassetPrinter) => &[
            TemplateNumber,
            ClinicCaseNumber,
            GlassCassetteNumber,
            StainingType,
            SendLabelButton,
        ],
        Some(DeviceClass::CassetPrinterHopper) => &[
            TemplateNumber,
            HopperNumber,
            ClinicCaseNumber,
            GlassCassetteNumber,
            StainingType,
            SendLabelButton,
        ],
        Some(DeviceClass::StickerPrinter) => &[StickerPrint, LabelText],
        Some(DeviceClass::ScannerDocs) => &[SendLabelButton],
        Some(DeviceClass::Other(_)) | None => &[],
    }
}

pub struct PanelController {
    http: Client,
    base_url: String,
    session: SessionContext,
    events: broadcast::Sender<ClientEvent>,
    devices: Vec<PrinterDescriptor>,
    selected: Option<PrinterDescriptor>,
    scanner_port: u16,
    phase: PanelPhase,
    status: Option<Notice>,
    preview: Option<ScanPreview>,
}

impl PanelController {
    pub fn new(
        http: Client,
        base_url: &str,
        session: SessionContext,
        events: broadcast::Sender<ClientEvent>,
    ) -> Result<Self, ActionError> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            session,
            events,
            devices: Vec::new(),
            selected: None,
            scanner_port: DEFAULT_SCANNER_PORT,
            phase: PanelPhase::Idle,
            status: None,
            preview: None,
        })
    }

    pub fn set_scanner_port(&mut self, port: u16) {
        self.scanner_port = port;
    }

    /// Installs the externally fetched descriptor list. A current selection
    /// is re-matched against the new list, so repopulation keeps or drops it
    /// depending on whether the address is still known.
    pub fn load_devices(&mut self, devices: Vec<PrinterDescriptor>) {
        let current = self.selected.as_ref().map(|d| d.ip_address.clone());
        self.devices = devices;
        match current {
            Some(ip) => self.select(&ip),
            None => {
                self.phase = PanelPhase::AwaitingSelection;
                self.status = None;
            }
        }
        info!(devices = self.devices.len(), "panel: device list loaded");
    }

    pub fn suggestions(&self) -> Vec<DeviceSuggestion> {
        self.devices
            .iter()
            .map(|device| DeviceSuggestion {
                value: device.ip_address.clone(),
                label: match &device.location {
                    Some(location) => format!(
                        "{} | {} ({location})",
                        device.device_class, device.ip_address
                    ),
                    None => format!("{} | {}", device.device_class, device.ip_address),
                },
            })
            .collect()
    }

    /// Applies the typed/selected input value. A match on a known address
    /// configures the panel for that device's class; anything else falls
    /// back to the nothing-selected layout. Re-layout clears the status
    /// line.
    pub fn select(&mut self, input: &str) {
        self.status = None;
        match self
            .devices
            .iter()
            .find(|device| device.ip_address == input)
        {
            Some(device) => {
                let device = device.clone();
                info!(ip = %device.ip_address, class = %device.device_class, "panel: device selected");
                self.phase = PanelPhase::Configured(device.device_class.clone());
                self.selected = Some(device);
            }
            None => {
                self.selected = None;
                self.phase = PanelPhase::AwaitingSelection;
            }
        }
    }

    pub fn phase(&self) -> &PanelPhase {
        &self.phase
    }

    pub fn selected_device(&self) -> Option<&PrinterDescriptor> {
        self.selected.as_ref()
    }

    /// Inline status line, when one is showing.
    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub fn preview(&self) -> Option<&ScanPreview> {
        self.preview.as_ref()
    }

    /// Currently visible field groups: the class layout table, plus the
    /// scan preview container only while the last scan succeeded.
    pub fn visible_groups(&self) -> Vec<FieldGroup> {
        let mut groups = layout_for(self.selected.as_ref().map(|d| &d.device_class)).to_vec();
        if self.phase == PanelPhase::ScanSucceeded {
            groups.push(FieldGroup::ScannerPreview);
        }
        groups
    }

    /// Runs a scan against the selected device. With no selection, reports
    /// the inline error and returns without issuing a request.
    pub async fn scan(&mut self) -> Result<(), ActionError> {
        let Some(device) = self.selected.clone() else {
            self.set_status(Notice::error(MISSING_SELECTION_MESSAGE));
            return Err(ActionError::NoDeviceSelected);
        };

        self.phase = PanelPhase::Scanning;
        self.set_status(Notice::pending("scan in progress"));
        info!(
            scanner_ip = %device.ip_address,
            scanner_port = self.scanner_port,
            "panel: scan requested"
        );

        match self.request_scan(&device).await {
            Ok(bytes) => {
                info!(size = bytes.len(), "panel: scan image received");
                self.preview = Some(ScanPreview { bytes });
                self.phase = PanelPhase::ScanSucceeded;
                self.set_status(Notice::success("scan complete"));
                let _ = self.events.send(ClientEvent::ScanPreviewUpdated);
                Ok(())
            }
            Err(err) => {
                self.phase = PanelPhase::ScanFailed;
                self.set_status(Notice::error(format!("scan failed: {err}")));
                warn!(error = %err, "panel: scan failed");
                Err(err)
            }
        }
    }

    async fn request_scan(&self, device: &PrinterDescriptor) -> Result<Vec<u8>, ActionError> {
        let token = self.session.access_token().await?.unwrap_or_default();
        let port = self.scanner_port.to_string();
        let response = self
            .http
            .get(format!("{}/api/scanner/scan", self.base_url))
            .query(&[
                ("scanner_ip", device.ip_address.as_str()),
                ("scanner_port", port.as_str()),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActionError::Api {
                status: status.as_u16(),
                detail: format!("HTTP {}", status.as_u16()),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Sends label content to the backend's print route. The HTTP exchange
    /// succeeding does not imply the label printed: the report's status
    /// decides which notice is shown.
    pub async fn send_label(&mut self, content: &str) -> Result<PrintReport, ActionError> {
        self.set_status(Notice::pending("sending label to printer"));

        match self.request_print(content).await {
            Ok(report) => {
                if report.succeeded() {
                    let method = report.method.as_deref().unwrap_or("printer");
                    info!(method, "panel: label accepted");
                    self.set_status(Notice::success(format!("label sent via {method}")));
                } else {
                    let detail = report
                        .detail
                        .clone()
                        .unwrap_or_else(|| PRINT_FAILURE_MESSAGE.to_string());
                    warn!(detail = %detail, "panel: label rejected");
                    self.set_status(Notice::error(detail));
                }
                Ok(report)
            }
            Err(err) => {
                self.set_status(Notice::error(PRINT_FAILURE_MESSAGE));
                warn!(error = %err, "panel: label print request failed");
                Err(err)
            }
        }
    }

    async fn request_print(&self, content: &str) -> Result<PrintReport, ActionError> {
        let response = self
            .http
            .post(format!("{}/print_code_label", self.base_url))
            .form(&[("content", content)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<PrintReport>().await?)
    }

    fn set_status(&mut self, notice: Notice) {
        self.status = Some(notice.clone());
        let _ = self.events.send(ClientEvent::Notice(notice));
    }
}
